//! dblog - Structured Log Persistence
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use dblog::config::{Backend, CliArgs, Command, PipelineConfig};
use dblog::db::{open_database, LogStore, SharedConnection};
use dblog::{LogFlags, Logger};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    setup_logging(args.verbose)?;

    match args.command {
        Command::Clear => {
            let store = LogStore::new(open(&args.database)?);
            store.clear().context("Failed to clear logs")?;
            info!(database = %args.database.display(), "Logs cleared");
        }

        Command::Print {
            prefix,
            all,
            window,
        } => {
            let store = LogStore::new(open(&args.database)?);
            let prefix = if all { None } else { Some(prefix.as_str()) };

            let lines = store
                .latest_within(window.duration(), prefix)
                .context("Failed to read logs")?;
            debug!(count = lines.len(), ?window, "Read logs");

            for line in lines {
                println!("{}", line);
            }
        }

        Command::Add {
            prefix,
            log,
            backend,
            rocks_path,
            buffered,
            workers,
            queue_size,
        } => {
            if log.is_empty() {
                println!("provide log to add");
                return Ok(());
            }

            let pipeline = if buffered {
                Some(PipelineConfig::new(queue_size, workers).context("Invalid pipeline settings")?)
            } else {
                None
            };

            match backend {
                Backend::Sqlite => add_sqlite(&args.database, &prefix, &log, pipeline)?,
                #[cfg(feature = "rocksdb")]
                Backend::Rocks => add_rocks(&rocks_path, &prefix, &log, pipeline)?,
            }

            #[cfg(not(feature = "rocksdb"))]
            let _ = rocks_path;
        }
    }

    Ok(())
}

fn open(path: &Path) -> Result<SharedConnection> {
    open_database(path).with_context(|| format!("Failed to open database {}", path.display()))
}

fn add_sqlite(db: &Path, prefix: &str, msg: &str, pipeline: Option<PipelineConfig>) -> Result<()> {
    let conn = open(db)?;
    let flags = LogFlags::full();

    match pipeline {
        Some(pipeline) => {
            let logger = Logger::sqlite_buffered(prefix, flags, conn, pipeline)
                .context("Failed to start buffered logger")?;
            logger.print(msg).context("Failed to queue log")?;
            logger.close().context("Failed to drain buffered logger")?;
            report_dropped(logger.sink().stats().dropped())
        }
        None => {
            let logger = Logger::sqlite(prefix, flags, conn).context("Failed to create logger")?;
            logger.print(msg).context("Failed to add log")?;
            Ok(())
        }
    }
}

#[cfg(feature = "rocksdb")]
fn add_rocks(path: &Path, prefix: &str, msg: &str, pipeline: Option<PipelineConfig>) -> Result<()> {
    let flags = LogFlags::full();

    match pipeline {
        Some(pipeline) => {
            let logger = Logger::rocks_buffered(prefix, flags, path, pipeline)
                .context("Failed to start buffered logger")?;
            logger.print(msg).context("Failed to queue log")?;
            logger.close().context("Failed to drain buffered logger")?;
            report_dropped(logger.sink().stats().dropped())
        }
        None => {
            let logger = Logger::rocks(prefix, flags, path).context("Failed to create logger")?;
            logger.print(msg).context("Failed to add log")?;
            Ok(())
        }
    }
}

/// Buffered writes never report per-line errors; surface them at exit
fn report_dropped(dropped: u64) -> Result<()> {
    if dropped > 0 {
        anyhow::bail!("{} log line(s) were not persisted", dropped);
    }
    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("dblog=debug,warn")
    } else {
        EnvFilter::new("dblog=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
