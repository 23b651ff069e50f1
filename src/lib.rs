//! dblog - Structured Log Persistence
//!
//! A logger that renders messages into a fixed line format, parses each line
//! back into a structured record, and stores it in SQLite or RocksDB. Writes
//! can go straight to the backend or through a bounded worker pool.
//!
//! # Features
//!
//! - **Line Parser**: `<prefix>\t[date ][time ][file:line: ]<payload>` into a
//!   [`LogRecord`], with defaults for any missing date or time.
//!
//! - **Two Backends**: one row per record in SQLite, or one JSON value per
//!   prefix and second in RocksDB (last write wins).
//!
//! - **Buffered Writes**: bounded queue with backpressure and a fixed worker
//!   pool; `close` drains every queued line before returning.
//!
//! - **Windowed Reads**: latest day or week of SQLite records, optionally
//!   filtered by prefix.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Logger::print                             │
//! │            prefix \t date time file:line: message               │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!               ┌───────────────┴────────────────┐
//!               │ direct                         │ buffered
//!               ▼                                ▼
//! ┌──────────────────────────┐    ┌──────────────────────────────────┐
//! │   Sink::write (caller)   │    │  Line Queue (crossbeam bounded)  │
//! │                          │    │  ┌────────┐ ┌────────┐ ┌────────┐│
//! │                          │    │  │Worker 1│ │Worker 2│…│Worker N││
//! │                          │    │  └───┬────┘ └───┬────┘ └───┬────┘│
//! └────────────┬─────────────┘    └──────┼──────────┼──────────┼─────┘
//!              │                         └──────────┼──────────┘
//!              ▼                                    ▼
//!        ┌──────────────────────────────────────────────────┐
//!        │        LogParser  ──▶  LogRecord                 │
//!        └───────────────┬──────────────────┬───────────────┘
//!                        ▼                  ▼
//!              ┌──────────────────┐  ┌──────────────────┐
//!              │  SQLite  (log)   │  │  RocksDB (KV)    │
//!              └────────┬─────────┘  └──────────────────┘
//!                       ▼
//!              ┌──────────────────┐
//!              │  LogStore reads  │
//!              └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! dblog add -p INFO -l 'service started'
//! dblog add -p ERROR -l 'disk full' --buffered
//! dblog print -p ERROR --window week
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod parser;
pub mod pipeline;
pub mod record;
#[cfg(feature = "rocksdb")]
pub mod rocksdb;
pub mod sink;

pub use config::PipelineConfig;
pub use db::{LogStore, SqliteSink};
pub use error::{LoggerError, Result};
pub use logger::{FileTag, LogFlags, Logger};
pub use parser::LogParser;
pub use pipeline::BufferedSink;
pub use record::LogRecord;
#[cfg(feature = "rocksdb")]
pub use rocksdb::RocksSink;
pub use sink::Sink;
