//! Benchmarks for dblog
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use dblog::config::PipelineConfig;
use dblog::db::open_in_memory;
use dblog::{BufferedSink, LogFlags, LogParser, Logger, Sink, SqliteSink};

fn benchmark_parse(c: &mut Criterion) {
    let parser = LogParser::new();

    c.bench_function("parse_full_line", |b| {
        let line = "INFO\t2023/01/15 10:30:00.123456 main.rs:42: request served in 12ms";
        b.iter(|| black_box(parser.parse(black_box(line)).unwrap()))
    });

    c.bench_function("parse_bare_line", |b| {
        let line = "INFO\trequest served in 12ms";
        b.iter(|| black_box(parser.parse(black_box(line)).unwrap()))
    });
}

fn benchmark_sqlite_sink(c: &mut Criterion) {
    let conn = open_in_memory().unwrap();
    let sink = SqliteSink::new(conn, "INFO").unwrap();
    let line = b"INFO\t2023/01/15 10:30:00 main.rs:42: request served";

    c.bench_function("sqlite_sink_write", |b| {
        b.iter(|| sink.write(black_box(line)).unwrap())
    });
}

fn benchmark_buffered_logger(c: &mut Criterion) {
    c.bench_function("buffered_logger_1000_lines", |b| {
        b.iter_batched(
            || {
                let conn = open_in_memory().unwrap();
                let sink = BufferedSink::new(
                    SqliteSink::new(conn, "INFO").unwrap(),
                    PipelineConfig::new(50, 4).unwrap(),
                )
                .unwrap();
                Logger::new(sink, LogFlags::full())
            },
            |logger| {
                for i in 0..1000 {
                    logger.print(&format!("request {}", i)).unwrap();
                }
                logger.close().unwrap();
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    benchmark_parse,
    benchmark_sqlite_sink,
    benchmark_buffered_logger
);
criterion_main!(benches);
