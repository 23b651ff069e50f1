//! Error types for dblog
//!
//! This module defines the error hierarchy that covers:
//! - Construction/configuration errors (bad prefix, bad pipeline sizing)
//! - Log line parse errors
//! - SQLite and RocksDB storage errors
//! - Buffered pipeline lifecycle errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Storage errors wrap the backend's own error unchanged
//! - Preserve error chains for debugging

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for dblog
#[derive(Error, Debug)]
pub enum LoggerError {
    /// Construction/configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A raw line could not be turned into a record
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// SQLite errors
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// RocksDB errors
    #[cfg(feature = "rocksdb")]
    #[error("RocksDB error: {0}")]
    Rocks(#[from] RocksError),

    /// Buffered pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

impl LoggerError {
    /// True if this error rejected a line before any persistence was attempted
    pub fn is_parse_error(&self) -> bool {
        matches!(self, LoggerError::Parse(_))
    }

    /// True if the underlying storage backend failed
    pub fn is_storage_error(&self) -> bool {
        match self {
            LoggerError::Database(_) => true,
            #[cfg(feature = "rocksdb")]
            LoggerError::Rocks(_) => true,
            _ => false,
        }
    }
}

/// Construction and configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Prefix contains something other than word characters
    #[error("Invalid prefix '{prefix}': must match ^\\w+$")]
    InvalidPrefix { prefix: String },

    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid queue capacity
    #[error("Invalid queue capacity {capacity}: must be at least {min}")]
    InvalidQueueCapacity { capacity: usize, min: usize },
}

/// Log line parse errors
///
/// Both variants reject the write before anything is persisted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Line does not start with a prefix token followed by whitespace
    #[error("Invalid log. Unable to parse")]
    InvalidLog,

    /// Date/time fragment had the right shape but is not a real date or time
    #[error("Invalid timestamp '{fragment}': {reason}")]
    InvalidTimestamp { fragment: String, reason: String },
}

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to create database file
    #[error("Failed to create database at '{path}': {reason}")]
    CreateFailed { path: PathBuf, reason: String },

    /// Stored row could not be turned back into a record
    #[error("Database schema error: {0}")]
    Schema(String),
}

/// RocksDB errors
#[cfg(feature = "rocksdb")]
#[derive(Error, Debug)]
pub enum RocksError {
    /// RocksDB operation failed
    #[error("RocksDB error: {0}")]
    Rocks(#[from] rocksdb::Error),

    /// JSON encoding/decoding of a stored record failed
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (directory handling)
    #[error("I/O error: {0}")]
    Io(String),
}

/// Buffered pipeline errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Write attempted after close() began
    #[error("Buffered sink is closed")]
    Closed,

    /// Worker thread could not be started
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Worker thread panicked while draining
    #[error("Worker {id} panicked")]
    WorkerPanicked { id: usize },
}

/// Result type alias for LoggerError
pub type Result<T> = std::result::Result<T, LoggerError>;

/// Result type alias for DbError
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Result type alias for RocksError
#[cfg(feature = "rocksdb")]
pub type RocksResult<T> = std::result::Result<T, RocksError>;
