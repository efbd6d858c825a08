//! SQLite-backed key-value storage.
//!
//! All persisted state (training history, reminder settings) is plain JSON
//! under string keys in a single `kv` table.

use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{data_dir, KvStore};
use crate::error::StoreError;

/// SQLite database holding the key-value table.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `<data_dir>/eyegym.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::open_at(&dir.join("eyegym.db"))
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    ) -> Result<T, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Unavailable("database connection poisoned".into()))?;
        Ok(f(&conn)?)
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
            let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
            match result {
                Ok(v) => Ok(Some(v)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map(|_| ())
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
                .map(|_| ())
        })
    }
}

/// A [`Database`] that is opened on first access.
///
/// Construction never touches the filesystem. A failed open is retried on
/// the next access.
pub struct LazyDatabase {
    path: Option<PathBuf>,
    db: Mutex<Option<Arc<Database>>>,
}

impl LazyDatabase {
    /// Lazily open `<data_dir>/eyegym.db`.
    pub fn new() -> Self {
        Self {
            path: None,
            db: Mutex::new(None),
        }
    }

    /// Lazily open the database at `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            db: Mutex::new(None),
        }
    }

    pub fn is_open(&self) -> bool {
        self.db.lock().map(|g| g.is_some()).unwrap_or(false)
    }

    fn get_or_open(&self) -> Result<Arc<Database>, StoreError> {
        let mut guard = self
            .db
            .lock()
            .map_err(|_| StoreError::Unavailable("lazy database poisoned".into()))?;
        if let Some(db) = guard.as_ref() {
            return Ok(db.clone());
        }
        let db = match &self.path {
            Some(path) => Database::open_at(path)?,
            None => Database::open()?,
        };
        let db = Arc::new(db);
        *guard = Some(db.clone());
        Ok(db)
    }
}

impl Default for LazyDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for LazyDatabase {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.get_or_open()?.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.get_or_open()?.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.get_or_open()?.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.get("test").unwrap().is_none());
        db.set("test", "hello").unwrap();
        assert_eq!(db.get("test").unwrap().unwrap(), "hello");
        db.set("test", "again").unwrap();
        assert_eq!(db.get("test").unwrap().unwrap(), "again");
        db.remove("test").unwrap();
        assert!(db.get("test").unwrap().is_none());
    }

    #[test]
    fn file_database_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eyegym.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.set("training_history", "[]").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.get("training_history").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn lazy_database_opens_on_first_access() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lazy.db");
        let lazy = LazyDatabase::at(&path);
        assert!(!lazy.is_open());
        assert!(!path.exists());

        lazy.set("k", "v").unwrap();
        assert!(lazy.is_open());
        assert!(path.exists());
        assert_eq!(lazy.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn lazy_database_reports_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("nested").join("x.db");
        let lazy = LazyDatabase::at(&path);
        assert!(lazy.get("k").is_err());
        assert!(!lazy.is_open());
    }
}
