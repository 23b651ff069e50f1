//! Sink abstraction
//!
//! A sink accepts one raw formatted line, parses it, and persists the result.
//! Backends:
//! - [`crate::db::SqliteSink`]: one row per line in the `log` table
//! - `crate::rocksdb::RocksSink`: one JSON value per line under a
//!   prefix/second key
//!
//! [`crate::pipeline::BufferedSink`] wraps any sink and moves the work onto a
//! worker pool.

use crate::error::Result;
use std::sync::Arc;

/// Parse-and-persist capability
///
/// Implementations validate their prefix once, at construction, and must be
/// safe to call from several worker threads at once.
pub trait Sink: Send + Sync {
    /// Prefix this sink was constructed with
    fn prefix(&self) -> &str;

    /// Parse and persist one line, returning the number of bytes consumed
    ///
    /// A line that does not parse is rejected before any storage call.
    fn write(&self, raw: &[u8]) -> Result<usize>;
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn prefix(&self) -> &str {
        (**self).prefix()
    }

    fn write(&self, raw: &[u8]) -> Result<usize> {
        (**self).write(raw)
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn prefix(&self) -> &str {
        (**self).prefix()
    }

    fn write(&self, raw: &[u8]) -> Result<usize> {
        (**self).write(raw)
    }
}
