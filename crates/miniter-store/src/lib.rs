//! # miniter-store
//!
//! Durable storage for Miniter, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed helpers for users, follow
//! edges, tweets and timeline composition.

pub mod database;
pub mod follows;
pub mod migrations;
pub mod models;
pub mod timeline;
pub mod tweets;
pub mod users;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
pub use tweets::validate_tweet;
