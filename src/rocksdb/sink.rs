//! RocksDB-backed sink
//!
//! Each parsed line is stored with a single `put`. Lines with the same prefix
//! logged within the same second collide on their key and the last write wins.

use crate::error::{Result, RocksError};
use crate::parser::LogParser;
use crate::record::validate_prefix;
use crate::rocksdb::schema::RocksHandle;
use crate::sink::Sink;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// Sink that stores one JSON value per prefix and second
pub struct RocksSink {
    handle: Arc<RocksHandle>,
    parser: LogParser,
    prefix: String,
}

impl RocksSink {
    /// Create a sink on an already open database
    pub fn new(handle: Arc<RocksHandle>, prefix: &str) -> Result<Self> {
        validate_prefix(prefix)?;

        Ok(Self {
            handle,
            parser: LogParser::new(),
            prefix: prefix.to_string(),
        })
    }

    /// Open (creating if needed) the database at `path` and build a sink on it
    ///
    /// The prefix is checked before the database is touched.
    pub fn open<P: AsRef<Path>>(path: P, prefix: &str) -> Result<Self> {
        validate_prefix(prefix)?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(RocksError::Io(format!(
                    "Parent directory '{}' does not exist",
                    parent.display()
                ))
                .into());
            }
        }

        let handle = RocksHandle::open(path)?;
        debug!(path = %path.display(), "Opened RocksDB log store");

        Self::new(Arc::new(handle), prefix)
    }

    /// Database this sink writes to
    pub fn handle(&self) -> &Arc<RocksHandle> {
        &self.handle
    }
}

impl Sink for RocksSink {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn write(&self, raw: &[u8]) -> Result<usize> {
        let line = String::from_utf8_lossy(raw);
        let record = self.parser.parse(&line)?;

        self.handle.put_record(&record)?;
        trace!(prefix = record.prefix(), bytes = raw.len(), "Stored log value");

        Ok(raw.len())
    }
}
