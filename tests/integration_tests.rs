//! Integration tests for dblog
//!
//! These run the public API end to end against in-memory or temporary
//! databases.

use chrono::{Duration as ChronoDuration, Utc};
use dblog::config::PipelineConfig;
use dblog::db::{open_database, open_in_memory, LogStore};
use dblog::error::{ConfigError, LoggerError};
use dblog::record::WIRE_TIMESTAMP_FORMAT;
use dblog::{BufferedSink, LogFlags, LogParser, LogRecord, Logger, Sink, SqliteSink};
use std::time::Duration;
use tempfile::tempdir;

fn line_at(prefix: &str, age: ChronoDuration, msg: &str) -> String {
    let ts = Utc::now() - age;
    format!("{}\t{} app.rs:7: {}", prefix, ts.format(WIRE_TIMESTAMP_FORMAT), msg)
}

#[test]
fn test_database_schema_creation() {
    let dir = tempdir().unwrap();
    let conn = open_database(&dir.path().join("logs.db")).unwrap();
    let conn = conn.lock();

    let tables: Vec<String> = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table'")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(tables, vec!["log".to_string()]);

    let journal_mode: String = conn
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .unwrap();
    assert_eq!(journal_mode, "wal");
}

#[test]
fn test_sqlite_write_then_read() {
    let conn = open_in_memory().unwrap();
    let sink = SqliteSink::new(conn.clone(), "INFO").unwrap();
    let store = LogStore::new(conn);

    sink.write(line_at("INFO", ChronoDuration::minutes(5), "fresh").as_bytes())
        .unwrap();
    sink.write(line_at("INFO", ChronoDuration::days(3), "older").as_bytes())
        .unwrap();
    sink.write(line_at("INFO", ChronoDuration::days(30), "ancient").as_bytes())
        .unwrap();
    sink.write(line_at("ERROR", ChronoDuration::minutes(1), "other prefix").as_bytes())
        .unwrap();

    let day = store.latest_day_with_prefix("INFO").unwrap();
    assert_eq!(day.len(), 1);
    assert!(day[0].starts_with("INFO::["));
    assert!(day[0].ends_with("\n\tfresh"));

    let week = store.latest_week_with_prefix("INFO").unwrap();
    assert_eq!(week.len(), 2);

    assert_eq!(store.latest_day().unwrap().len(), 2);
    assert_eq!(store.latest_week().unwrap().len(), 3);
    assert_eq!(store.count().unwrap(), 4);
}

#[test]
fn test_example_line_end_to_end() {
    let conn = open_in_memory().unwrap();
    let sink = SqliteSink::new(conn.clone(), "INFO").unwrap();

    let line = "INFO\t2023/01/15 10:30:00.000000 main.go:42: starting up";
    assert_eq!(sink.write(line.as_bytes()).unwrap(), line.len());

    let (log_time, file, payload): (i64, String, String) = conn
        .lock()
        .query_row("SELECT log_time, file, payload FROM log", [], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })
        .unwrap();
    assert_eq!(log_time, 1_673_778_600_000_000);
    assert_eq!(file, "main.go:42:");
    assert_eq!(payload, "starting up");

    // Far outside the day window
    assert!(LogStore::new(conn).latest_day().unwrap().is_empty());
}

#[test]
fn test_records_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("logs.db");

    {
        let logger = Logger::sqlite("AUDIT", LogFlags::full(), open_database(&path).unwrap())
            .unwrap();
        logger.print("user=1 action=login").unwrap();
        logger.print("user=1 action=logout").unwrap();
    }

    let store = LogStore::new(open_database(&path).unwrap());
    let records = store
        .records_within(Duration::from_secs(3600), Some("AUDIT"))
        .unwrap();

    assert_eq!(records.len(), 2);
    let payloads: Vec<&str> = records.iter().map(LogRecord::payload).collect();
    assert!(payloads.contains(&"user=1 action=login"));
    assert!(payloads.contains(&"user=1 action=logout"));
    assert!(records.iter().all(|r| r.file().starts_with("tests/")));
}

#[test]
fn test_buffered_persists_exactly_the_parseable_lines() {
    let conn = open_in_memory().unwrap();
    let sink = BufferedSink::new(
        SqliteSink::new(conn.clone(), "INFO").unwrap(),
        PipelineConfig::new(8, 4).unwrap(),
    )
    .unwrap();

    for i in 0..100 {
        let line = line_at("INFO", ChronoDuration::seconds(i), &format!("msg {}", i));
        assert!(sink.write(line.as_bytes()).is_ok());
    }
    for bad in ["", "INFO", "no-tab here", "INFO\t2023/13/45 oops"] {
        assert!(sink.write(bad.as_bytes()).is_ok());
    }

    sink.close().unwrap();

    assert_eq!(LogStore::new(conn).count().unwrap(), 100);
    assert_eq!(sink.stats().persisted(), 100);
    assert_eq!(sink.stats().dropped(), 4);
    assert!(matches!(
        sink.write(b"INFO\tlate"),
        Err(LoggerError::Pipeline(_))
    ));
}

#[test]
fn test_clear_then_empty_reads() {
    let conn = open_in_memory().unwrap();
    let store = LogStore::new(conn.clone());

    for prefix in ["INFO", "WARN", "ERROR"] {
        let logger = Logger::sqlite(prefix, LogFlags::default(), conn.clone()).unwrap();
        logger.print("something happened").unwrap();
    }
    assert_eq!(store.latest_day().unwrap().len(), 3);

    store.clear().unwrap();

    assert!(store.latest_day().unwrap().is_empty());
    assert!(store.latest_week_with_prefix("WARN").unwrap().is_empty());
    assert_eq!(store.count().unwrap(), 0);

    store.clear().unwrap();
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_invalid_prefix_everywhere() {
    let conn = open_in_memory().unwrap();

    let is_invalid_prefix = |err: LoggerError| {
        matches!(err, LoggerError::Config(ConfigError::InvalidPrefix { .. }))
    };

    assert!(is_invalid_prefix(
        SqliteSink::new(conn.clone(), "bad prefix").err().unwrap()
    ));
    assert!(is_invalid_prefix(
        Logger::sqlite("", LogFlags::default(), conn.clone()).err().unwrap()
    ));
    assert!(is_invalid_prefix(
        Logger::sqlite_buffered("a-b", LogFlags::default(), conn, PipelineConfig::default())
            .err()
            .unwrap()
    ));
}

#[test]
fn test_parser_round_trip() {
    let parser = LogParser::new();
    let line = "WARN\t2024/02/29 23:59:59.123456 lib.rs:1: leap day\n\tsecond line";

    let record = parser.parse(line).unwrap();
    assert_eq!(record.prefix(), "WARN");
    assert_eq!(record.file(), "lib.rs:1:");
    assert_eq!(record.payload(), "leap day\n\tsecond line");

    let again = parser.parse(&record.to_line()).unwrap();
    assert_eq!(again, record);
}

#[cfg(feature = "rocksdb")]
mod rocks {
    use super::*;
    use dblog::rocksdb::RocksHandle;
    use dblog::RocksSink;
    use std::sync::Arc;

    #[test]
    fn test_rocks_last_write_wins_within_a_second() {
        let dir = tempdir().unwrap();
        let sink = RocksSink::open(dir.path().join("logs.rocks"), "INFO").unwrap();

        sink.write(b"INFO\t2023/01/15 10:30:00.100000 first").unwrap();
        sink.write(b"INFO\t2023/01/15 10:30:00.900000 second").unwrap();
        sink.write(b"INFO\t2023/01/15 10:30:01 third").unwrap();

        let handle = sink.handle();
        assert_eq!(handle.count_entries().unwrap(), 2);

        let records: Vec<LogRecord> = handle
            .iter_records()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(records[0].payload(), "second");
        assert_eq!(records[1].payload(), "third");
    }

    #[test]
    fn test_rocks_buffered_logger() {
        let dir = tempdir().unwrap();
        let handle = Arc::new(RocksHandle::open(dir.path().join("logs.rocks")).unwrap());

        let sink = BufferedSink::new(
            RocksSink::new(Arc::clone(&handle), "INFO").unwrap(),
            PipelineConfig::new(4, 2).unwrap(),
        )
        .unwrap();
        let logger = Logger::new(sink, LogFlags::default());

        logger.print("one").unwrap();
        logger.close().unwrap();

        assert_eq!(logger.sink().stats().persisted(), 1);
        assert_eq!(handle.count_entries().unwrap(), 1);
    }

    #[test]
    fn test_rocks_invalid_prefix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs.rocks");

        let err = Logger::rocks("no spaces", LogFlags::default(), &path).err().unwrap();
        assert!(matches!(
            err,
            LoggerError::Config(ConfigError::InvalidPrefix { .. })
        ));
        assert!(!path.exists());
    }
}
