//! Configuration types for dblog
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Buffered pipeline configuration with validation

use crate::error::ConfigError;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Default bounded queue capacity for buffered sinks
pub const DEFAULT_QUEUE_CAPACITY: usize = 50;

/// Default worker count for buffered sinks
pub const DEFAULT_WORKER_COUNT: usize = 10;

/// Maximum reasonable worker count
pub const MAX_WORKERS: usize = 512;

/// Minimum queue capacity (0 would turn the queue into a rendezvous channel)
const MIN_QUEUE_CAPACITY: usize = 1;

/// Store and inspect application logs in SQLite or RocksDB
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dblog",
    version,
    about = "Store and inspect application logs in SQLite or RocksDB",
    after_help = "EXAMPLES:\n    \
        dblog add -p INFO -l 'service started'\n    \
        dblog add -p ERROR -l 'disk full' --buffered --workers 4\n    \
        dblog add -p INFO -l 'cached' --backend rocks --rocks-path logs.rocks\n    \
        dblog print -p ERROR --window week\n    \
        dblog clear"
)]
pub struct CliArgs {
    /// SQLite database file
    #[arg(short = 'd', long, default_value = "logs.db", value_name = "FILE", global = true)]
    pub database: PathBuf,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Clear all logs from the SQLite database
    #[command(visible_alias = "c")]
    Clear,

    /// Print logs from a past time window
    Print {
        /// Only show logs with this prefix
        #[arg(short = 'p', long, default_value = "INFO")]
        prefix: String,

        /// Show logs from every prefix (ignores --prefix)
        #[arg(long)]
        all: bool,

        /// How far back to look
        #[arg(short = 'w', long, value_enum, default_value_t = Window::Day)]
        window: Window,
    },

    /// Add a log line through the logging path
    #[command(visible_alias = "a")]
    Add {
        /// Log prefix (word characters only)
        #[arg(short = 'p', long, default_value = "INFO")]
        prefix: String,

        /// Message to log
        #[arg(short = 'l', long, default_value = "")]
        log: String,

        /// Storage backend
        #[arg(short = 'b', long, value_enum, default_value_t = Backend::Sqlite)]
        backend: Backend,

        /// RocksDB directory (rocks backend only)
        #[arg(long, default_value = "logs.rocks", value_name = "DIR")]
        rocks_path: PathBuf,

        /// Write through the buffered worker pool
        #[arg(long)]
        buffered: bool,

        /// Worker threads for --buffered
        #[arg(long, default_value_t = DEFAULT_WORKER_COUNT, value_name = "NUM")]
        workers: usize,

        /// Queue capacity for --buffered
        #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY, value_name = "NUM")]
        queue_size: usize,
    },
}

/// Time window for `print`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Window {
    Day,
    Week,
}

impl Window {
    pub fn duration(self) -> Duration {
        match self {
            Window::Day => Duration::from_secs(24 * 60 * 60),
            Window::Week => Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

/// Storage backend for `add`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Sqlite,
    #[cfg(feature = "rocksdb")]
    Rocks,
}

/// Sizing of a buffered sink's queue and worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Bounded queue capacity; writers block when it is full
    pub queue_capacity: usize,

    /// Number of worker threads draining the queue
    pub worker_count: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }
}

impl PipelineConfig {
    pub fn new(queue_capacity: usize, worker_count: usize) -> Result<Self, ConfigError> {
        let config = Self {
            queue_capacity,
            worker_count,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 || self.worker_count > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: self.worker_count,
                max: MAX_WORKERS,
            });
        }

        if self.queue_capacity < MIN_QUEUE_CAPACITY {
            return Err(ConfigError::InvalidQueueCapacity {
                capacity: self.queue_capacity,
                min: MIN_QUEUE_CAPACITY,
            });
        }

        Ok(())
    }
}
