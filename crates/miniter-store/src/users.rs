//! CRUD operations for [`User`] records.

use chrono::Utc;
use miniter_shared::UserId;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::{is_constraint, Result, StoreError};
use crate::models::{format_ts, parse_ts, NewUser, User};

const USER_COLUMNS: &str =
    "id, name, email, profile, hashed_password, profile_picture, created_at";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new user and return the stored row.
    ///
    /// Fails with [`StoreError::DuplicateEmail`] when the email is taken.
    pub fn create_user(&mut self, new_user: &NewUser) -> Result<User> {
        let tx = self.conn_mut().transaction()?;

        tx.execute(
            "INSERT INTO users (name, email, profile, hashed_password, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new_user.name,
                new_user.email,
                new_user.profile,
                new_user.hashed_password,
                format_ts(&Utc::now()),
            ],
        )
        .map_err(|e| {
            if is_constraint(&e, rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE) {
                StoreError::DuplicateEmail(new_user.email.clone())
            } else {
                StoreError::Sqlite(e)
            }
        })?;

        let id = tx.last_insert_rowid();
        let user = tx.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            row_to_user,
        )?;
        tx.commit()?;

        tracing::debug!(user_id = %user.id, "user created");
        Ok(user)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_user(&self, id: UserId) -> Result<User> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id.get()],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::UserNotFound(id),
                other => StoreError::Sqlite(other),
            })
    }

    /// Look a user up by email. `None` when no account uses it.
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn user_exists(&self, id: UserId) -> Result<bool> {
        let found = self
            .conn()
            .query_row(
                "SELECT 1 FROM users WHERE id = ?1",
                params![id.get()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    // ------------------------------------------------------------------
    // Profile picture
    // ------------------------------------------------------------------

    pub fn set_profile_picture(&self, id: UserId, url: &str) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE users SET profile_picture = ?1 WHERE id = ?2",
            params![url, id.get()],
        )?;
        if affected == 0 {
            return Err(StoreError::UserNotFound(id));
        }
        Ok(())
    }

    pub fn get_profile_picture(&self, id: UserId) -> Result<Option<String>> {
        self.conn()
            .query_row(
                "SELECT profile_picture FROM users WHERE id = ?1",
                params![id.get()],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::UserNotFound(id),
                other => StoreError::Sqlite(other),
            })
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let created_str: String = row.get(6)?;

    Ok(User {
        id: UserId(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        profile: row.get(3)?,
        hashed_password: row.get(4)?,
        profile_picture: row.get(5)?,
        created_at: parse_ts(&created_str, 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::new_user;

    #[test]
    fn create_and_fetch_user() {
        let mut db = Database::open_in_memory().unwrap();

        let created = db.create_user(&new_user(1)).unwrap();
        assert_eq!(created.name, "testname01");
        assert_eq!(created.email, "test01@gmail.com");
        assert_eq!(created.profile, "test profile 01");
        assert_eq!(created.profile_picture, None);

        let by_id = db.get_user(created.id).unwrap();
        assert_eq!(by_id, created);

        let by_email = db.get_user_by_email("test01@gmail.com").unwrap();
        assert_eq!(by_email, Some(created));
    }

    #[test]
    fn ids_are_server_generated_and_distinct() {
        let mut db = Database::open_in_memory().unwrap();

        let a = db.create_user(&new_user(1)).unwrap();
        let b = db.create_user(&new_user(2)).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        db.create_user(&new_user(1)).unwrap();

        let mut dup = new_user(2);
        dup.email = "test01@gmail.com".into();

        let err = db.create_user(&dup).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(ref e) if e == "test01@gmail.com"));

        // The failed insert left nothing behind.
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn unknown_lookups() {
        let db = Database::open_in_memory().unwrap();

        assert!(matches!(
            db.get_user(UserId(99)),
            Err(StoreError::UserNotFound(UserId(99)))
        ));
        assert_eq!(db.get_user_by_email("nobody@example.com").unwrap(), None);
        assert!(!db.user_exists(UserId(99)).unwrap());
    }

    #[test]
    fn profile_picture_update() {
        let mut db = Database::open_in_memory().unwrap();
        let user = db.create_user(&new_user(1)).unwrap();
        let url = "http://localhost:8080/media/profile_image/1.png";

        assert_eq!(db.get_profile_picture(user.id).unwrap(), None);

        db.set_profile_picture(user.id, url).unwrap();
        assert_eq!(db.get_profile_picture(user.id).unwrap().as_deref(), Some(url));
        assert_eq!(
            db.get_user(user.id).unwrap().profile_picture.as_deref(),
            Some(url)
        );
    }

    #[test]
    fn profile_picture_unknown_user() {
        let db = Database::open_in_memory().unwrap();

        assert!(matches!(
            db.set_profile_picture(UserId(5), "x"),
            Err(StoreError::UserNotFound(_))
        ));
        assert!(matches!(
            db.get_profile_picture(UserId(5)),
            Err(StoreError::UserNotFound(_))
        ));
    }
}
