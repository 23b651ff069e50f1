//! RocksDB schema definitions
//!
//! Records live in a single flat keyspace (the default column family):
//!
//! ```text
//! key   = <prefix>!<20-digit zero-padded unix seconds>
//! value = JSON {"prefix", "timestamp", "file", "payload"}
//! ```
//!
//! Keys sort by prefix, then by second. Two records with the same prefix in
//! the same second share a key; the later put wins.

use crate::error::RocksResult;
use crate::record::LogRecord;
use chrono::{DateTime, Utc};
use rocksdb::{IteratorMode, Options, DB};
use std::path::Path;

/// Separator between prefix and timestamp in keys
pub const KEY_SEPARATOR: char = '!';

/// Encode the key for a record: `<prefix>!<%020d unix seconds>`
pub fn encode_key(prefix: &str, timestamp: DateTime<Utc>) -> Vec<u8> {
    format!("{}{}{:020}", prefix, KEY_SEPARATOR, timestamp.timestamp()).into_bytes()
}

/// Database configuration for append-heavy log workloads
pub fn get_db_options() -> Options {
    let mut opts = Options::default();
    opts.create_if_missing(true);

    opts.increase_parallelism(num_cpus::get() as i32);
    opts.set_max_background_jobs(4);

    // Allow concurrent memtable writes from sink workers
    opts.set_allow_concurrent_memtable_write(true);
    opts.set_enable_write_thread_adaptive_yield(true);

    // Write buffer: 2 x 16MB
    opts.set_write_buffer_size(16 * 1024 * 1024);
    opts.set_max_write_buffer_number(2);

    // Bloom filter for point lookups (10 bits/key)
    let mut block_opts = rocksdb::BlockBasedOptions::default();
    block_opts.set_bloom_filter(10.0, false);
    opts.set_block_based_table_factory(&block_opts);

    opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

    opts
}

/// RocksDB handle wrapper
///
/// `DB` is thread-safe, so one handle can be shared by every sink and worker.
pub struct RocksHandle {
    pub db: DB,
}

impl RocksHandle {
    /// Open or create database
    pub fn open<P: AsRef<Path>>(path: P) -> RocksResult<Self> {
        let db = DB::open(&get_db_options(), path)?;
        Ok(Self { db })
    }

    /// Store a record under its derived key, replacing any previous value
    pub fn put_record(&self, record: &LogRecord) -> RocksResult<()> {
        let key = encode_key(record.prefix(), record.timestamp());
        let value = serde_json::to_vec(record)?;
        self.db.put(key, value)?;
        Ok(())
    }

    /// Get the record stored for a prefix and second
    pub fn get_record(
        &self,
        prefix: &str,
        timestamp: DateTime<Utc>,
    ) -> RocksResult<Option<LogRecord>> {
        match self.db.get(encode_key(prefix, timestamp))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Iterate all records in key order
    pub fn iter_records(&self) -> impl Iterator<Item = RocksResult<LogRecord>> + '_ {
        self.db.iterator(IteratorMode::Start).map(|result| -> RocksResult<LogRecord> {
            let (_, value) = result?;
            Ok(serde_json::from_slice(&value)?)
        })
    }

    /// Count entries (by iterating - O(n))
    pub fn count_entries(&self) -> RocksResult<u64> {
        let mut count = 0u64;
        for item in self.db.iterator(IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }
}
