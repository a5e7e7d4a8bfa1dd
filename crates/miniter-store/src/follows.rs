//! Follow-graph edges.
//!
//! An edge `(user_id, follow_user_id)` means `user_id`'s timeline includes
//! `follow_user_id`'s tweets. Edges are binary: both follow and unfollow are
//! idempotent, and a self-follow is accepted but never stored.

use chrono::Utc;
use miniter_shared::UserId;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::format_ts;

impl Database {
    /// Make `follower` follow `followee`.
    ///
    /// Returns `true` if a new edge was created, `false` if it already
    /// existed or `follower == followee`. Fails with
    /// [`StoreError::UserNotFound`] when `followee` does not exist.
    pub fn follow(&self, follower: UserId, followee: UserId) -> Result<bool> {
        if follower == followee {
            tracing::debug!(user_id = %follower, "ignoring self-follow");
            return Ok(false);
        }

        if !self.user_exists(followee)? {
            return Err(StoreError::UserNotFound(followee));
        }

        let inserted = self.conn().execute(
            "INSERT OR IGNORE INTO users_follow_list (user_id, follow_user_id, created_at)
             VALUES (?1, ?2, ?3)",
            params![follower.get(), followee.get(), format_ts(&Utc::now())],
        )?;
        Ok(inserted > 0)
    }

    /// Remove the `follower -> followee` edge. Returns `true` if one existed.
    pub fn unfollow(&self, follower: UserId, followee: UserId) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM users_follow_list WHERE user_id = ?1 AND follow_user_id = ?2",
            params![follower.get(), followee.get()],
        )?;
        Ok(affected > 0)
    }

    pub fn is_following(&self, follower: UserId, followee: UserId) -> Result<bool> {
        let found = self
            .conn()
            .query_row(
                "SELECT 1 FROM users_follow_list WHERE user_id = ?1 AND follow_user_id = ?2",
                params![follower.get(), followee.get()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Ids of everyone `user` follows, in follow order.
    pub fn following(&self, user: UserId) -> Result<Vec<UserId>> {
        let mut stmt = self.conn().prepare(
            "SELECT follow_user_id FROM users_follow_list
             WHERE user_id = ?1
             ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![user.get()], |row| Ok(UserId(row.get(0)?)))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }
}
