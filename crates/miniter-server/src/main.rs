//! # miniter-server
//!
//! HTTP backend for the Miniter micro-blogging service.
//!
//! This binary provides:
//! - **Accounts**: sign-up with salted password hashes and login issuing
//!   24-hour session tokens
//! - **Tweets, follows and timelines** backed by a single SQLite database
//! - **Profile pictures** stored on local disk and served under `/media`

mod api;
mod auth;
mod config;
mod db;
mod directory;
mod error;
mod media;

use std::sync::Arc;

use miniter_shared::session::SessionKeys;
use miniter_store::Database;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::db::Db;
use crate::media::MediaStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,miniter_server=debug,miniter_store=debug")),
        )
        .init();

    info!("Starting Miniter server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------
    let database = Database::open_at(&config.database_path)?;
    info!(path = %config.database_path.display(), "Database ready");

    let sessions = Arc::new(SessionKeys::new(
        config.jwt_secret.as_bytes(),
        config.session_ttl_secs,
    ));
    info!(ttl_secs = sessions.ttl().num_seconds(), "Session keys ready");

    let media = Arc::new(
        MediaStore::new(
            config.media_path.clone(),
            config.media_base_url.clone(),
            config.max_profile_picture_size,
        )
        .await?,
    );

    let http_addr = config.http_addr;
    let app_state = AppState {
        db: Db::new(database),
        sessions,
        media,
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
