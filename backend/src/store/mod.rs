//! SQLite persistence for the form schema and the value history.
//!
//! One connection is shared behind a mutex. Every mutation of the schema runs in a
//! transaction and re-validates the whole configuration before committing, so the stored
//! schema is always one that [`FormConfig::validate`] accepts.

mod config;
mod history;

pub use history::HISTORY_LIMIT;

use common::error::ConfigurationError;
use common::model::FormConfig;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS fields (
    id              TEXT PRIMARY KEY,
    position        INTEGER NOT NULL,
    display_name    TEXT NOT NULL,
    placeholder     TEXT NOT NULL,
    field_type      TEXT NOT NULL,
    sort_order      INTEGER NOT NULL,
    required        INTEGER NOT NULL,
    remember_values INTEGER NOT NULL,
    formula         TEXT,
    decimal_places  INTEGER
);
CREATE TABLE IF NOT EXISTS templates (
    id                 TEXT PRIMARY KEY,
    position           INTEGER NOT NULL,
    display_name       TEXT NOT NULL,
    file_name          TEXT NOT NULL,
    download_pattern   TEXT NOT NULL,
    required_field_ids TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS field_history (
    seq      INTEGER PRIMARY KEY AUTOINCREMENT,
    field_id TEXT NOT NULL,
    value    TEXT NOT NULL,
    UNIQUE (field_id, value)
);
";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid stored data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid stored field type '{0}'")]
    FieldType(String),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
    #[error("{kind} '{id}' already exists")]
    Conflict { kind: &'static str, id: String },
    #[error("database connection is poisoned")]
    Poisoned,
}

#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Store {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&mut conn)
    }

    pub fn load_config(&self) -> Result<FormConfig, StoreError> {
        self.with_conn(|conn| config::load(conn))
    }
}
