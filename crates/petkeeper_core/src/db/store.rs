//! Process-level store handle.
//!
//! # Responsibility
//! - Hold the single application connection between `open` and `close`.
//! - Serialize access so one logical operation runs at a time.
//!
//! # Invariants
//! - A closed store never reopens; callers construct a new one.
//! - Every borrow of the connection happens under the store mutex.

use super::{open_db, open_db_in_memory, DbError, DbResult};
use log::info;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Explicitly constructed storage client shared by the repositories.
///
/// The composition root opens one `Store` at startup, hands it to the
/// services (usually as `Arc<Store>`), and calls [`Store::close`] at
/// shutdown.
#[derive(Debug)]
pub struct Store {
    conn: Mutex<Option<Connection>>,
    path: Option<PathBuf>,
}

impl Store {
    /// Opens (creating if needed) a file-backed store.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = open_db(&path)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: Some(path),
        })
    }

    /// Opens a private in-memory store. Data is lost on close.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: None,
        })
    }

    /// Database file path, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Runs `f` with the open connection.
    ///
    /// # Errors
    /// - Returns `DbError::Closed` (converted into `E`) after [`Store::close`].
    /// - Returns whatever `f` returns.
    pub fn with_connection<T, E>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(DbError::Closed)?;
        f(conn)
    }

    /// Closes the connection. Returns `false` when already closed.
    ///
    /// # Errors
    /// - Returns the SQLite error when the connection refuses to close; the
    ///   store is considered closed either way.
    pub fn close(&self) -> DbResult<bool> {
        let Some(conn) = self.lock().take() else {
            return Ok(false);
        };
        conn.close().map_err(|(_, err)| DbError::Sqlite(err))?;
        info!("event=db_close module=db status=ok");
        Ok(true)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        // Poison is ignored; an interrupted transaction rolled back on drop.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::Store;
    use crate::db::{DbError, DbResult};

    #[test]
    fn closed_store_rejects_operations() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.is_open());
        assert!(store.close().unwrap());
        assert!(!store.is_open());
        assert!(!store.close().unwrap());

        let result: DbResult<()> = store.with_connection(|_| Ok(()));
        assert!(matches!(result, Err(DbError::Closed)));
    }

    #[test]
    fn file_store_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.sqlite3");
        let store = Store::open(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        assert!(path.exists());
    }
}
