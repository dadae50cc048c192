//! Durable storage gateway backed by SQLite.
//!
//! A single `kv` table holds JSON-serialized values; a `schema_version`
//! table tracks migrations so the database is safe to open from any build.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::{ChangeListener, StorageGateway};
use crate::types::errors::StorageError;

/// Current schema version. Bump this when adding a new migration.
const CURRENT_SCHEMA_VERSION: i32 = 1;

pub struct SqliteGateway {
    conn: Connection,
    listeners: Vec<ChangeListener>,
}

impl SqliteGateway {
    /// Opens (or creates) a database file and runs migrations.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(backend)?;
        Self::from_connection(conn)
    }

    /// Opens an in-memory database. The data is discarded on drop.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(backend)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        run_migrations(&conn).map_err(backend)?;
        Ok(Self {
            conn,
            listeners: Vec::new(),
        })
    }

    fn notify(&self, key: &str) {
        for listener in &self.listeners {
            listener(key);
        }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }
}

fn backend(e: rusqlite::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current < 1 {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                 key TEXT PRIMARY KEY,
                 value TEXT NOT NULL,
                 updated_at INTEGER NOT NULL
             );",
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
            params![CURRENT_SCHEMA_VERSION, SqliteGateway::now(), "Initial schema: kv store"],
        )?;
    }

    Ok(())
}

impl StorageGateway for SqliteGateway {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(backend)?;
        match raw {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        let text =
            serde_json::to_string(&value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, text, Self::now()],
            )
            .map_err(backend)?;
        self.notify(key);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let affected = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(backend)?;
        if affected > 0 {
            self.notify(key);
        }
        Ok(())
    }

    fn subscribe(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }
}
