//! Timeline composition.
//!
//! A user's timeline is every tweet they authored plus every tweet by
//! someone they follow, most recent first. It is computed on read from the
//! follow graph and the tweets table; nothing is precomputed or cached.

use miniter_shared::UserId;
use rusqlite::params;

use crate::database::Database;
use crate::error::Result;
use crate::models::{parse_ts, TimelineEntry};

impl Database {
    /// Compose the timeline for `user`.
    ///
    /// Ordered by creation time descending; tweets sharing a timestamp keep
    /// insertion order. A user with no tweets and no follows gets an empty
    /// list. Each tweet appears once.
    pub fn compose_timeline(&self, user: UserId) -> Result<Vec<TimelineEntry>> {
        let mut stmt = self.conn().prepare(
            "SELECT t.user_id, t.tweet, t.created_at
             FROM tweets AS t
             WHERE t.user_id = ?1
                OR t.user_id IN (
                    SELECT follow_user_id
                    FROM users_follow_list
                    WHERE user_id = ?1
                )
             ORDER BY t.created_at DESC, t.id ASC",
        )?;

        let rows = stmt.query_map(params![user.get()], |row| {
            let ts_str: String = row.get(2)?;
            Ok(TimelineEntry {
                author_id: UserId(row.get(0)?),
                body: row.get(1)?,
                created_at: parse_ts(&ts_str, 2)?,
            })
        })?;

        let mut timeline = Vec::new();
        for row in rows {
            timeline.push(row?);
        }

        tracing::debug!(user_id = %user, entries = timeline.len(), "timeline composed");
        Ok(timeline)
    }
}
