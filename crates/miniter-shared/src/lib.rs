//! # miniter-shared
//!
//! Types and primitives shared by the Miniter store and server: user ids,
//! protocol constants, password hashing and signed session tokens.

pub mod constants;
pub mod error;
pub mod password;
pub mod session;
pub mod types;

pub use error::{PasswordError, SessionError};
pub use types::UserId;
