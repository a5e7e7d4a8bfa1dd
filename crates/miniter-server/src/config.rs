//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use miniter_shared::constants::{
    DEFAULT_HTTP_PORT, MAX_PROFILE_PICTURE_SIZE, MAX_SESSION_TTL_SECS, SESSION_TTL_SECS,
};

/// Signing secret used when `JWT_SECRET_KEY` is unset. Development only.
const DEV_JWT_SECRET: &str = "miniter-dev-secret-change-me";

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// SQLite database file.
    /// Env: `DATABASE_PATH`
    /// Default: `./miniter.db`
    pub database_path: PathBuf,

    /// HMAC secret for session tokens.
    /// Env: `JWT_SECRET_KEY`
    /// Default: a fixed development secret (a warning is logged).
    pub jwt_secret: String,

    /// Session token lifetime in seconds, at most 365 days.
    /// Env: `SESSION_TTL_SECS`
    /// Default: `86400` (24 hours)
    pub session_ttl_secs: i64,

    /// Directory where uploaded profile pictures are written.
    /// Env: `MEDIA_PATH`
    /// Default: `./media`
    pub media_path: PathBuf,

    /// Public URL prefix under which `media_path` is served. Must end in `/`.
    /// Env: `MEDIA_BASE_URL`
    /// Default: `http://localhost:8080/media/`
    pub media_base_url: String,

    /// Maximum profile picture size in bytes (5 MiB).
    /// Env: `MAX_PROFILE_PICTURE_SIZE`
    pub max_profile_picture_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: PathBuf::from("./miniter.db"),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            session_ttl_secs: SESSION_TTL_SECS,
            media_path: PathBuf::from("./media"),
            media_base_url: format!("http://localhost:{DEFAULT_HTTP_PORT}/media/"),
            max_profile_picture_size: MAX_PROFILE_PICTURE_SIZE,
        }
    }
}

// Keeps the signing secret out of logs.
impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("http_addr", &self.http_addr)
            .field("database_path", &self.database_path)
            .field("jwt_secret", &"<redacted>")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("media_path", &self.media_path)
            .field("media_base_url", &self.media_base_url)
            .field("max_profile_picture_size", &self.max_profile_picture_size)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(path) = lookup("DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }

        match lookup("JWT_SECRET_KEY") {
            Some(secret) if !secret.is_empty() => config.jwt_secret = secret,
            _ => tracing::warn!("JWT_SECRET_KEY not set, using development secret"),
        }

        if let Some(val) = lookup("SESSION_TTL_SECS") {
            match val.parse::<i64>() {
                Ok(n) if (1..=MAX_SESSION_TTL_SECS).contains(&n) => config.session_ttl_secs = n,
                _ => tracing::warn!(value = %val, "Invalid SESSION_TTL_SECS, using default"),
            }
        }

        if let Some(path) = lookup("MEDIA_PATH") {
            config.media_path = PathBuf::from(path);
        }

        if let Some(url) = lookup("MEDIA_BASE_URL") {
            config.media_base_url = if url.ends_with('/') {
                url
            } else {
                format!("{url}/")
            };
        }

        if let Some(val) = lookup("MAX_PROFILE_PICTURE_SIZE") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_profile_picture_size = n,
                _ => tracing::warn!(value = %val, "Invalid MAX_PROFILE_PICTURE_SIZE, using default"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use miniter_shared::session::SessionKeys;

    use super::*;

    fn from_map(vars: &[(&str, &str)]) -> ServerConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.session_ttl_secs, 86_400);
        assert!(config.media_base_url.ends_with('/'));
    }

    #[test]
    fn test_overrides() {
        let config = from_map(&[
            ("HTTP_ADDR", "127.0.0.1:9000"),
            ("DATABASE_PATH", "/tmp/m.db"),
            ("JWT_SECRET_KEY", "s3cret"),
            ("SESSION_TTL_SECS", "60"),
            ("MEDIA_BASE_URL", "https://cdn.example.com/m"),
        ]);

        assert_eq!(config.http_addr, ([127, 0, 0, 1], 9000).into());
        assert_eq!(config.database_path, PathBuf::from("/tmp/m.db"));
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.session_ttl_secs, 60);
        assert_eq!(config.media_base_url, "https://cdn.example.com/m/");
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = from_map(&[
            ("HTTP_ADDR", "not-an-addr"),
            ("SESSION_TTL_SECS", "-5"),
            ("JWT_SECRET_KEY", ""),
            ("MAX_PROFILE_PICTURE_SIZE", "huge"),
        ]);

        assert_eq!(config.http_addr, ServerConfig::default().http_addr);
        assert_eq!(config.session_ttl_secs, SESSION_TTL_SECS);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.max_profile_picture_size, MAX_PROFILE_PICTURE_SIZE);
    }

    #[test]
    fn test_session_ttl_upper_bound() {
        let huge = from_map(&[("SESSION_TTL_SECS", "9223372036854775807")]);
        assert_eq!(huge.session_ttl_secs, SESSION_TTL_SECS);
        // Must not panic when building the keys.
        SessionKeys::new(huge.jwt_secret.as_bytes(), huge.session_ttl_secs);

        let year = MAX_SESSION_TTL_SECS.to_string();
        let at_limit = from_map(&[("SESSION_TTL_SECS", year.as_str())]);
        assert_eq!(at_limit.session_ttl_secs, MAX_SESSION_TTL_SECS);

        let over = (MAX_SESSION_TTL_SECS + 1).to_string();
        let past_limit = from_map(&[("SESSION_TTL_SECS", over.as_str())]);
        assert_eq!(past_limit.session_ttl_secs, SESSION_TTL_SECS);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = from_map(&[("JWT_SECRET_KEY", "top-secret-value")]);
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("top-secret-value"));
    }
}
