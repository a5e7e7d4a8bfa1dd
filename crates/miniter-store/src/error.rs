use miniter_shared::UserId;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A referenced user does not exist.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Sign-up with an email that is already registered.
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// Tweet body over the character limit.
    #[error("Tweet too long: {chars} characters (max {max})")]
    TweetTooLong { chars: usize, max: usize },

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// True when `err` is a SQLite constraint violation with the given extended code.
pub(crate) fn is_constraint(err: &rusqlite::Error, extended_code: std::ffi::c_int) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == extended_code
    )
}
