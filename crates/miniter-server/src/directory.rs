//! User directory: account registration and credential checks.
//!
//! Password hashing is CPU-bound, so it runs on the blocking pool and never
//! while the database lock is held.

use miniter_shared::password::{hash_password, verify_password};
use miniter_shared::UserId;
use miniter_store::{NewUser, User};
use tracing::info;

use crate::db::Db;
use crate::error::ServerError;

/// Outcome of a credential check.
///
/// `user_id` is `None` when no account has the email, and `Some` when the
/// account exists, whether or not the password matched. Callers must not
/// expose that difference to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authentication {
    pub authorized: bool,
    pub user_id: Option<UserId>,
}

impl Authentication {
    /// The authenticated user, only when the password matched.
    pub fn granted(&self) -> Option<UserId> {
        if self.authorized {
            self.user_id
        } else {
            None
        }
    }
}

/// Create an account, storing a salted hash of `password`.
pub async fn register(
    db: &Db,
    name: String,
    email: String,
    profile: String,
    password: String,
) -> Result<User, ServerError> {
    let hashed_password = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ServerError::Internal(format!("hash task failed: {e}")))?
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    let new_user = NewUser {
        name,
        email,
        profile,
        hashed_password,
    };
    let user = db.call(move |db| db.create_user(&new_user)).await?;

    info!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Check `password` against the account registered under `email`.
pub async fn authenticate(
    db: &Db,
    email: String,
    password: String,
) -> Result<Authentication, ServerError> {
    let user = db.call(move |db| db.get_user_by_email(&email)).await?;

    let Some(user) = user else {
        return Ok(Authentication {
            authorized: false,
            user_id: None,
        });
    };

    let hash = user.hashed_password;
    let authorized = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ServerError::Internal(format!("verify task failed: {e}")))?;

    Ok(Authentication {
        authorized,
        user_id: Some(user.id),
    })
}

#[cfg(test)]
mod tests {
    use miniter_store::Database;

    use super::*;

    fn test_db() -> Db {
        Db::new(Database::open_in_memory().unwrap())
    }

    async fn register_user(db: &Db, n: u32) -> User {
        register(
            db,
            format!("testname{n:02}"),
            format!("test{n:02}@gmail.com"),
            format!("test profile {n:02}"),
            format!("testpw{n:02}"),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let db = test_db();
        let user = register_user(&db, 1).await;

        assert_ne!(user.hashed_password, "testpw01");
        assert!(verify_password("testpw01", &user.hashed_password));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let db = test_db();
        register_user(&db, 1).await;

        let err = register(
            &db,
            "someone else".into(),
            "test01@gmail.com".into(),
            String::new(),
            "other".into(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServerError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_authenticate_round_trip() {
        let db = test_db();
        let user = register_user(&db, 1).await;

        let ok = authenticate(&db, "test01@gmail.com".into(), "testpw01".into())
            .await
            .unwrap();
        assert_eq!(
            ok,
            Authentication {
                authorized: true,
                user_id: Some(user.id)
            }
        );
        assert_eq!(ok.granted(), Some(user.id));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let db = test_db();
        let user = register_user(&db, 1).await;

        let denied = authenticate(&db, "test01@gmail.com".into(), "wrong".into())
            .await
            .unwrap();
        assert!(!denied.authorized);
        assert_eq!(denied.user_id, Some(user.id));
        assert_eq!(denied.granted(), None);
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email() {
        let db = test_db();

        let denied = authenticate(&db, "nobody@gmail.com".into(), "pw".into())
            .await
            .unwrap();
        assert_eq!(
            denied,
            Authentication {
                authorized: false,
                user_id: None
            }
        );
    }
}
