//! SQLite-backed sink
//!
//! Each successfully parsed line becomes exactly one row in the `log` table.
//! Inserts go through a cached prepared statement on the shared connection.

use crate::db::schema::SharedConnection;
use crate::error::{DbError, Result};
use crate::parser::LogParser;
use crate::record::{validate_prefix, LogRecord};
use crate::sink::Sink;
use rusqlite::params;
use tracing::trace;

const INSERT_LOG: &str =
    "INSERT INTO log (prefix, log_time, file, payload) VALUES (?1, ?2, ?3, ?4)";

/// Sink that inserts one row per line
pub struct SqliteSink {
    conn: SharedConnection,
    parser: LogParser,
    prefix: String,
}

impl SqliteSink {
    /// Create a sink on a connection whose schema already exists
    ///
    /// Fails with `ConfigError::InvalidPrefix` if `prefix` is not `^\w+$`.
    pub fn new(conn: SharedConnection, prefix: &str) -> Result<Self> {
        validate_prefix(prefix)?;

        Ok(Self {
            conn,
            parser: LogParser::new(),
            prefix: prefix.to_string(),
        })
    }

    /// Shared connection this sink writes to
    pub fn connection(&self) -> &SharedConnection {
        &self.conn
    }

    /// Insert an already-parsed record
    pub fn insert(&self, record: &LogRecord) -> Result<()> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(INSERT_LOG).map_err(DbError::from)?;
        stmt.execute(params![
            record.prefix(),
            record.timestamp_micros(),
            record.file(),
            record.payload(),
        ])
        .map_err(DbError::from)?;
        Ok(())
    }
}

impl Sink for SqliteSink {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn write(&self, raw: &[u8]) -> Result<usize> {
        let line = String::from_utf8_lossy(raw);
        let record = self.parser.parse(&line)?;

        self.insert(&record)?;
        trace!(prefix = record.prefix(), bytes = raw.len(), "Inserted log row");

        Ok(raw.len())
    }
}
