//! Database schema definitions and creation
//!
//! This module defines the SQLite schema for persisted log records and
//! provides functions to create and configure the database.

use crate::error::{DbError, DbResult};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

/// Connection shared by sinks, worker threads and the store layer
pub type SharedConnection = Arc<Mutex<Connection>>;

/// SQL to create the append-only log table
const CREATE_LOG_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS log (
    id INTEGER PRIMARY KEY,
    prefix TEXT NOT NULL,
    log_time INTEGER NOT NULL,    -- Microseconds since Unix epoch (UTC)
    file TEXT NOT NULL DEFAULT '',
    payload TEXT NOT NULL
)
"#;

/// Indexes backing the windowed queries
const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_log_time ON log(log_time)",
    "CREATE INDEX IF NOT EXISTS idx_log_prefix_time ON log(prefix, log_time)",
];

/// SQLite pragmas for concurrent sinks and readers
const PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA temp_store = MEMORY;
PRAGMA busy_timeout = 5000;
"#;

/// Create tables and indexes on an open connection
pub fn create_database(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(PRAGMAS)?;

    conn.execute(CREATE_LOG_TABLE, [])?;

    for sql in CREATE_INDEXES {
        conn.execute(sql, [])?;
    }

    Ok(())
}

/// Open (creating if needed) a database file with the log schema
pub fn open_database(path: &Path) -> DbResult<SharedConnection> {
    let conn = Connection::open(path).map_err(|e| DbError::CreateFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    create_database(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Open a private in-memory database with the log schema
pub fn open_in_memory() -> DbResult<SharedConnection> {
    let conn = Connection::open_in_memory()?;
    create_database(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}
