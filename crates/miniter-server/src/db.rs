//! Shared handle to the SQLite store.
//!
//! `rusqlite::Connection` is blocking and not `Sync`, so the one connection
//! lives behind a mutex and every request runs its storage work on the
//! blocking pool while holding the lock.

use std::sync::{Arc, Mutex};

use miniter_store::Database;

use crate::error::ServerError;

#[derive(Clone)]
pub struct Db {
    inner: Arc<Mutex<Database>>,
}

impl Db {
    pub fn new(database: Database) -> Self {
        Self {
            inner: Arc::new(Mutex::new(database)),
        }
    }

    /// Run `f` against the database on a blocking thread.
    pub async fn call<F, T>(&self, f: F) -> Result<T, ServerError>
    where
        F: FnOnce(&mut Database) -> miniter_store::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut db = inner
                .lock()
                .map_err(|_| ServerError::Internal("database lock poisoned".to_string()))?;
            f(&mut *db).map_err(ServerError::from)
        })
        .await
        .map_err(|e| ServerError::Internal(format!("database task failed: {e}")))?
    }
}
