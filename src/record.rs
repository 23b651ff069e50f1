//! Log record type
//!
//! A `LogRecord` is the unit of persistence: one parsed log line. Records are
//! built by the parser, handed to a storage backend, and dropped.

use crate::error::ConfigError;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Layout of the date/time header in the wire format
pub const WIRE_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.6f";

/// Layout of the timestamp in rendered (read-side) records
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f UTC";

/// Check that a prefix consists solely of word characters (`^\w+$`)
pub fn validate_prefix(prefix: &str) -> Result<(), ConfigError> {
    let valid = !prefix.is_empty()
        && prefix
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_');

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidPrefix {
            prefix: prefix.to_string(),
        })
    }
}

/// A structured log line
///
/// Field order is the serialization order used by the key-value backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    prefix: String,
    timestamp: DateTime<Utc>,
    file: String,
    payload: String,
}

impl LogRecord {
    /// Create a record. The timestamp is truncated to microseconds.
    pub fn new(
        prefix: impl Into<String>,
        timestamp: DateTime<Utc>,
        file: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            timestamp: timestamp.trunc_subsecs(6),
            file: file.into(),
            payload: payload.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// `file:line:` tag, empty if the line carried none
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Timestamp as microseconds since the Unix epoch (SQLite column value)
    pub fn timestamp_micros(&self) -> i64 {
        self.timestamp.timestamp_micros()
    }

    /// Render the record back into the wire format the parser consumes
    ///
    /// Always emits both date and time so the line parses back to an equal
    /// record.
    pub fn to_line(&self) -> String {
        let mut line = format!(
            "{}\t{} ",
            self.prefix,
            self.timestamp.format(WIRE_TIMESTAMP_FORMAT)
        );
        if !self.file.is_empty() {
            line.push_str(&self.file);
            line.push(' ');
        }
        line.push_str(&self.payload);
        line
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::[{}, {}]\n\t{}",
            self.prefix,
            self.timestamp.format(DISPLAY_TIMESTAMP_FORMAT),
            self.file,
            self.payload
        )
    }
}

/// Convert microseconds since the Unix epoch into a UTC timestamp
pub fn micros_to_datetime(micros: i64) -> Option<DateTime<Utc>> {
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(secs, nanos)
}
