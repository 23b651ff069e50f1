//! Read and admin access to persisted log records
//!
//! `LogStore` only works against the SQLite backend; the RocksDB backend is
//! write-only.

use crate::db::schema::SharedConnection;
use crate::error::{DbError, DbResult};
use crate::record::{micros_to_datetime, LogRecord};
use chrono::Utc;
use rusqlite::{params, Row};
use std::time::Duration;

const SELECT_WINDOW: &str =
    "SELECT prefix, log_time, file, payload FROM log WHERE log_time >= ?1";

const SELECT_WINDOW_WITH_PREFIX: &str =
    "SELECT prefix, log_time, file, payload FROM log WHERE log_time >= ?1 AND prefix = ?2";

const ONE_DAY: Duration = Duration::from_secs(24 * 60 * 60);
const ONE_WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Windowed retrieval and bulk clear over the `log` table
#[derive(Clone)]
pub struct LogStore {
    conn: SharedConnection,
}

impl LogStore {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Records logged within `window` of now, rendered for display
    ///
    /// Rows come back in whatever order SQLite returns them.
    pub fn latest_within(&self, window: Duration, prefix: Option<&str>) -> DbResult<Vec<String>> {
        Ok(self
            .records_within(window, prefix)?
            .iter()
            .map(LogRecord::to_string)
            .collect())
    }

    /// Records logged within `window` of now
    pub fn records_within(
        &self,
        window: Duration,
        prefix: Option<&str>,
    ) -> DbResult<Vec<LogRecord>> {
        let window_micros = i64::try_from(window.as_micros()).unwrap_or(i64::MAX);
        let cutoff = Utc::now().timestamp_micros().saturating_sub(window_micros);

        let conn = self.conn.lock();
        let rows = match prefix {
            Some(prefix) => {
                let mut stmt = conn.prepare_cached(SELECT_WINDOW_WITH_PREFIX)?;
                let rows = stmt.query_map(params![cutoff, prefix], read_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare_cached(SELECT_WINDOW)?;
                let rows = stmt.query_map(params![cutoff], read_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        rows.into_iter().map(into_record).collect()
    }

    pub fn latest_day(&self) -> DbResult<Vec<String>> {
        self.latest_within(ONE_DAY, None)
    }

    pub fn latest_week(&self) -> DbResult<Vec<String>> {
        self.latest_within(ONE_WEEK, None)
    }

    pub fn latest_day_with_prefix(&self, prefix: &str) -> DbResult<Vec<String>> {
        self.latest_within(ONE_DAY, Some(prefix))
    }

    pub fn latest_week_with_prefix(&self, prefix: &str) -> DbResult<Vec<String>> {
        self.latest_within(ONE_WEEK, Some(prefix))
    }

    /// Total number of stored rows
    pub fn count(&self) -> DbResult<u64> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM log", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Remove every record, regardless of prefix
    pub fn clear(&self) -> DbResult<()> {
        self.conn.lock().execute("DELETE FROM log", [])?;
        Ok(())
    }
}

type RawRow = (String, i64, String, String);

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn into_record((prefix, log_time, file, payload): RawRow) -> DbResult<LogRecord> {
    let timestamp = micros_to_datetime(log_time)
        .ok_or_else(|| DbError::Schema(format!("log_time out of range: {}", log_time)))?;
    Ok(LogRecord::new(prefix, timestamp, file, payload))
}
