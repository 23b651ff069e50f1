//! Logger front end
//!
//! `Logger` renders messages into the line format the parser understands and
//! hands each line to a [`Sink`]:
//!
//! ```text
//! <prefix>\t[YYYY/MM/DD ][HH:MM:SS[.ffffff] ][file:line: ]<message>
//! ```
//!
//! Which header parts are emitted is controlled by [`LogFlags`]. The file tag
//! is the caller's location, captured with `#[track_caller]`. Headers are
//! rendered in UTC.

use crate::config::PipelineConfig;
use crate::db::{SharedConnection, SqliteSink};
use crate::error::Result;
use crate::pipeline::BufferedSink;
use crate::sink::Sink;
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::panic::Location;

#[cfg(feature = "rocksdb")]
use crate::rocksdb::RocksSink;
#[cfg(feature = "rocksdb")]
use std::path::Path;

/// How the call site is rendered in the header
///
/// The parser only recognizes a tag without whitespace, so a path containing
/// spaces is read back as part of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileTag {
    /// No file tag
    #[default]
    None,
    /// File name only (`main.rs:12:`)
    Short,
    /// Path as recorded by the compiler (`src/main.rs:12:`)
    Long,
}

/// Header parts to emit before each message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogFlags {
    pub date: bool,
    pub time: bool,
    /// Microsecond resolution on the time; implies `time`
    pub microseconds: bool,
    pub file: FileTag,
}

impl Default for LogFlags {
    fn default() -> Self {
        Self {
            date: true,
            time: true,
            microseconds: false,
            file: FileTag::None,
        }
    }
}

impl LogFlags {
    /// Date, time with microseconds, and the full caller path
    pub fn full() -> Self {
        Self {
            date: true,
            time: true,
            microseconds: true,
            file: FileTag::Long,
        }
    }

    /// Message only; the record gets the time it was parsed at
    pub fn bare() -> Self {
        Self {
            date: false,
            time: false,
            microseconds: false,
            file: FileTag::None,
        }
    }
}

/// Formats messages and writes them to a sink
pub struct Logger<S: Sink> {
    sink: S,
    flags: LogFlags,
}

impl<S: Sink> Logger<S> {
    /// Build a logger on a sink; the sink's prefix is used for every line
    pub fn new(sink: S, flags: LogFlags) -> Self {
        Self { sink, flags }
    }

    pub fn prefix(&self) -> &str {
        self.sink.prefix()
    }

    pub fn flags(&self) -> LogFlags {
        self.flags
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Log one message
    ///
    /// Errors are whatever the sink reports: everything for a direct sink,
    /// only lifecycle errors for a buffered one.
    #[track_caller]
    pub fn print(&self, msg: &str) -> Result<usize> {
        let caller = Location::caller();
        let line = self.format_line(Utc::now(), caller.file(), caller.line(), msg);
        self.sink.write(line.as_bytes())
    }

    /// Render a line as `print` would at time `now` from `file:line`
    pub fn format_line(&self, now: DateTime<Utc>, file: &str, line: u32, msg: &str) -> String {
        let mut out = String::with_capacity(self.prefix().len() + msg.len() + 48);
        out.push_str(self.prefix());
        out.push('\t');

        if self.flags.date {
            let _ = write!(out, "{} ", now.format("%Y/%m/%d"));
        }

        if self.flags.microseconds {
            let _ = write!(out, "{} ", now.format("%H:%M:%S%.6f"));
        } else if self.flags.time {
            let _ = write!(out, "{} ", now.format("%H:%M:%S"));
        }

        match self.flags.file {
            FileTag::None => {}
            FileTag::Short => {
                let name = file.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(file);
                let _ = write!(out, "{}:{}: ", name, line);
            }
            FileTag::Long => {
                let _ = write!(out, "{}:{}: ", file, line);
            }
        }

        out.push_str(msg);
        out
    }
}

impl Logger<SqliteSink> {
    /// Logger writing synchronously to SQLite
    pub fn sqlite(prefix: &str, flags: LogFlags, conn: SharedConnection) -> Result<Self> {
        Ok(Self::new(SqliteSink::new(conn, prefix)?, flags))
    }
}

impl Logger<BufferedSink<SqliteSink>> {
    /// Logger writing to SQLite through a worker pool
    pub fn sqlite_buffered(
        prefix: &str,
        flags: LogFlags,
        conn: SharedConnection,
        pipeline: PipelineConfig,
    ) -> Result<Self> {
        let sink = BufferedSink::new(SqliteSink::new(conn, prefix)?, pipeline)?;
        Ok(Self::new(sink, flags))
    }
}

#[cfg(feature = "rocksdb")]
impl Logger<RocksSink> {
    /// Logger writing synchronously to RocksDB at `path`
    pub fn rocks<P: AsRef<Path>>(prefix: &str, flags: LogFlags, path: P) -> Result<Self> {
        Ok(Self::new(RocksSink::open(path, prefix)?, flags))
    }
}

#[cfg(feature = "rocksdb")]
impl Logger<BufferedSink<RocksSink>> {
    /// Logger writing to RocksDB at `path` through a worker pool
    pub fn rocks_buffered<P: AsRef<Path>>(
        prefix: &str,
        flags: LogFlags,
        path: P,
        pipeline: PipelineConfig,
    ) -> Result<Self> {
        let sink = BufferedSink::new(RocksSink::open(path, prefix)?, pipeline)?;
        Ok(Self::new(sink, flags))
    }
}

impl<S: Sink + 'static> Logger<BufferedSink<S>> {
    /// Drain the worker pool; see [`BufferedSink::close`]
    pub fn close(&self) -> Result<()> {
        self.sink.close()
    }
}
