/// Maximum tweet length, counted in characters (not bytes)
pub const MAX_TWEET_CHARS: usize = 300;

/// Default session token lifetime in seconds (24 hours)
pub const SESSION_TTL_SECS: i64 = 60 * 60 * 24;

/// Longest configurable session token lifetime in seconds (365 days)
pub const MAX_SESSION_TTL_SECS: i64 = SESSION_TTL_SECS * 365;

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Maximum profile picture upload size in bytes (5 MiB)
pub const MAX_PROFILE_PICTURE_SIZE: usize = 5 * 1024 * 1024;

/// Media sub-directory holding profile pictures
pub const PROFILE_IMAGE_DIR: &str = "profile_image";
