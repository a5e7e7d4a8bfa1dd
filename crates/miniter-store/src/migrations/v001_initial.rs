//! v001 -- Initial schema creation.
//!
//! Creates the three core tables: `users`, `tweets` and `users_follow_list`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    email           TEXT NOT NULL UNIQUE,
    profile         TEXT NOT NULL DEFAULT '',
    hashed_password TEXT NOT NULL,            -- argon2id PHC string
    created_at      TEXT NOT NULL             -- RFC-3339, UTC, microseconds
);

-- ----------------------------------------------------------------
-- Tweets
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS tweets (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL,              -- FK -> users(id)
    tweet      TEXT NOT NULL,
    created_at TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_tweets_user_ts
    ON tweets(user_id, created_at DESC);

-- ----------------------------------------------------------------
-- Follow edges (follower -> followee)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users_follow_list (
    user_id        INTEGER NOT NULL,          -- follower, FK -> users(id)
    follow_user_id INTEGER NOT NULL,          -- followee, FK -> users(id)
    created_at     TEXT NOT NULL,

    PRIMARY KEY (user_id, follow_user_id),
    FOREIGN KEY (user_id) REFERENCES users(id),
    FOREIGN KEY (follow_user_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_follow_followee
    ON users_follow_list(follow_user_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
