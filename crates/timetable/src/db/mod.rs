/// Durable key-value storage for client state (the saved selection)

mod memory;
mod types;

pub use memory::MemoryStore;
pub use types::{StoreError, StoredEntry};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

const SCHEMA_SQL: &str = include_str!("../../sql/init_store.sql");

/// A string-keyed store holding whole-value snapshots.
pub trait KeyValueStore {
    /// Reads an entry, or `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<StoredEntry>, StoreError>;

    /// Writes (or overwrites) the value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes the key. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Key-value store backed by a single SQLite table.
pub struct SqliteStore {
    db: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database file and initializes the schema.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)?;
        info!("Opened key-value store at {}", db_path.display());
        Self::with_connection(conn)
    }

    /// Creates a store that lives only as long as the process.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<StoredEntry>, StoreError> {
        let entry = self
            .conn()
            .query_row(
                "SELECT key, value, updated_at FROM kv_store WHERE key = ?1",
                [key],
                |row| {
                    Ok(StoredEntry {
                        key: row.get(0)?,
                        value: row.get(1)?,
                        updated_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn().execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            (key, value, Utc::now()),
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn()
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
        Ok(())
    }
}
