//! Domain model structs persisted in the SQLite database.
//!
//! Models derive `Serialize` so the HTTP layer can hand them straight to
//! clients; field names follow the wire format.

use chrono::{DateTime, SecondsFormat, Utc};
use miniter_shared::UserId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered account.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    /// Server-generated row id.
    pub id: UserId,
    pub name: String,
    /// Unique across all users.
    pub email: String,
    /// Free-form profile text.
    pub profile: String,
    /// argon2id PHC string. Never serialized.
    #[serde(skip_serializing)]
    pub hashed_password: String,
    /// Public URL of the profile picture, if one was uploaded.
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a [`User`]. The password is already hashed.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub profile: String,
    pub hashed_password: String,
}

// ---------------------------------------------------------------------------
// Tweet
// ---------------------------------------------------------------------------

/// A posted tweet. Immutable once stored.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Tweet {
    pub id: i64,
    #[serde(rename = "user_id")]
    pub author_id: UserId,
    #[serde(rename = "tweet")]
    pub body: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// One line of a composed timeline.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TimelineEntry {
    #[serde(rename = "user_id")]
    pub author_id: UserId,
    #[serde(rename = "tweet")]
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<Tweet> for TimelineEntry {
    fn from(t: Tweet) -> Self {
        Self {
            author_id: t.author_id,
            body: t.body,
            created_at: t.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Timestamp encoding
// ---------------------------------------------------------------------------

// Fixed-width so that ORDER BY on the text column is chronological.
pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(raw: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}
