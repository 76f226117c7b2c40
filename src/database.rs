use crate::dlog;
use crate::storage::{BlobStore, StorageError};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// Blob store backed by a single SQLite file.
pub struct SqliteBlobStore {
    conn: Connection,
}

impl SqliteBlobStore {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened sqlite blob store");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        if !table_exists(&conn, "blobs")? {
            dlog!("creating blobs table");
        }
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS blobs (
              key         TEXT PRIMARY KEY,
              value       TEXT NOT NULL,
              updated_at  TEXT NOT NULL
            );
            ",
        )?;
        Ok(Self { conn })
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM blobs WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            r"
            INSERT INTO blobs (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET
              value = excluded.value,
              updated_at = excluded.updated_at
            ",
            params![key, value, now],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let n = self.conn.execute("DELETE FROM blobs WHERE key = ?1", [key])?;
        dlog!("removed key={key} rows={n}");
        Ok(())
    }
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool, StorageError> {
    let mut stmt =
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}
