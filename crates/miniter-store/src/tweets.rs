//! Tweet storage.

use chrono::{DateTime, SubsecRound, Utc};
use miniter_shared::constants::MAX_TWEET_CHARS;
use miniter_shared::UserId;
use rusqlite::params;

use crate::database::Database;
use crate::error::{is_constraint, Result, StoreError};
use crate::models::{format_ts, parse_ts, Tweet};

/// Reject bodies over [`MAX_TWEET_CHARS`] characters.
///
/// Length is counted in Unicode scalar values, so multi-byte text gets the
/// same allowance as ASCII.
pub fn validate_tweet(body: &str) -> Result<()> {
    let chars = body.chars().count();
    if chars > MAX_TWEET_CHARS {
        return Err(StoreError::TweetTooLong {
            chars,
            max: MAX_TWEET_CHARS,
        });
    }
    Ok(())
}

impl Database {
    /// Validate and store a tweet stamped with the current server time.
    pub fn post_tweet(&self, author: UserId, body: &str) -> Result<Tweet> {
        self.insert_tweet_at(author, body, Utc::now())
    }

    pub(crate) fn insert_tweet_at(
        &self,
        author: UserId,
        body: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Tweet> {
        validate_tweet(body)?;
        // Stored with microsecond precision; return what a re-read would see.
        let created_at = created_at.trunc_subsecs(6);

        self.conn()
            .execute(
                "INSERT INTO tweets (user_id, tweet, created_at) VALUES (?1, ?2, ?3)",
                params![author.get(), body, format_ts(&created_at)],
            )
            .map_err(|e| {
                if is_constraint(&e, rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY) {
                    StoreError::UserNotFound(author)
                } else {
                    StoreError::Sqlite(e)
                }
            })?;

        Ok(Tweet {
            id: self.conn().last_insert_rowid(),
            author_id: author,
            body: body.to_string(),
            created_at,
        })
    }

    /// All tweets by one author, newest first.
    pub fn tweets_by_author(&self, author: UserId) -> Result<Vec<Tweet>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, user_id, tweet, created_at
             FROM tweets
             WHERE user_id = ?1
             ORDER BY created_at DESC, id ASC",
        )?;

        let rows = stmt.query_map(params![author.get()], row_to_tweet)?;

        let mut tweets = Vec::new();
        for row in rows {
            tweets.push(row?);
        }
        Ok(tweets)
    }
}

fn row_to_tweet(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tweet> {
    let ts_str: String = row.get(3)?;

    Ok(Tweet {
        id: row.get(0)?,
        author_id: UserId(row.get(1)?),
        body: row.get(2)?,
        created_at: parse_ts(&ts_str, 3)?,
    })
}
