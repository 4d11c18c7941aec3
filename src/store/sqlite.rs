use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::info;

use crate::errors::Result;
use crate::store::Store;

/// Contains the SQL queries used to interact with the database
pub mod sql_queries {
    pub const CREATE_TABLE: &str =
        "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)";

    pub const SELECT_VALUE: &str = "SELECT value FROM kv WHERE key = ?1";
    pub const UPSERT_VALUE: &str = "INSERT INTO kv (key, value) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value";
    pub const DELETE_VALUE: &str = "DELETE FROM kv WHERE key = ?1";
}

/// Key-value store kept in a single SQLite table
pub struct SQLiteStore {
    conn: Connection,
}

impl SQLiteStore {
    /// Open (or create) the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Opening store at {}", path.as_ref().display());
        Self::init(Connection::open(path)?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(sql_queries::CREATE_TABLE, [])?;
        Ok(SQLiteStore { conn })
    }
}

impl Store for SQLiteStore {
    fn new() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .prepare_cached(sql_queries::SELECT_VALUE)?
            .query_row(params![key], |row| row.get(0))
            .optional()
            .map_err(|err| err.into())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .prepare_cached(sql_queries::UPSERT_VALUE)?
            .execute(params![key, value])?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .prepare_cached(sql_queries::DELETE_VALUE)?
            .execute(params![key])?;
        Ok(())
    }
}
