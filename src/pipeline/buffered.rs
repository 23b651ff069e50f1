//! Buffered (asynchronous) sink
//!
//! Wraps any [`Sink`] with a bounded queue and a fixed pool of worker threads.
//! `write` only enqueues; parsing and persistence happen on the workers, and
//! their errors never reach the caller (see [`PipelineStats`] for counts).
//!
//! Lifecycle:
//!
//! ```text
//! Open ──close()──▶ Closing ──workers drained──▶ Closed
//! ```

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::pipeline::queue::{line_queue, LineSender, PipelineStats};
use crate::pipeline::worker::Worker;
use crate::sink::Sink;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle state of a buffered sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Accepting lines, workers draining
    Open,
    /// No new lines accepted, workers finishing the backlog
    Closing,
    /// All workers exited
    Closed,
}

/// Sink that persists lines on a worker pool
pub struct BufferedSink<S: Sink + 'static> {
    inner: Arc<S>,

    /// `None` once closing has begun; dropping it disconnects the queue
    sender: RwLock<Option<LineSender>>,

    workers: Mutex<Vec<Worker>>,

    state: Mutex<PipelineState>,

    stats: Arc<PipelineStats>,

    config: PipelineConfig,
}

impl<S: Sink + 'static> BufferedSink<S> {
    /// Wrap `inner` with the default queue capacity (50) and worker count (10)
    pub fn with_defaults(inner: S) -> Result<Self> {
        Self::new(inner, PipelineConfig::default())
    }

    /// Wrap `inner` and start the worker pool
    pub fn new(inner: S, config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let inner = Arc::new(inner);
        let stats = Arc::new(PipelineStats::default());
        let (queue_tx, queue_rx) = line_queue(config.queue_capacity, Arc::clone(&stats));

        let mut workers = Vec::with_capacity(config.worker_count);
        for id in 0..config.worker_count {
            match Worker::spawn(id, queue_rx.clone(), Arc::clone(&inner), Arc::clone(&stats)) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    // Disconnect the queue so already-started workers exit
                    drop(queue_tx);
                    for worker in workers {
                        let _ = worker.join();
                    }
                    return Err(e.into());
                }
            }
        }

        info!(
            prefix = inner.prefix(),
            workers = config.worker_count,
            capacity = config.queue_capacity,
            "Buffered sink started"
        );

        Ok(Self {
            inner,
            sender: RwLock::new(Some(queue_tx)),
            workers: Mutex::new(workers),
            state: Mutex::new(PipelineState::Open),
            stats,
            config,
        })
    }

    /// Stop accepting lines and wait until every queued line is handled
    ///
    /// Blocks with no timeout. Safe to call more than once and from several
    /// threads; every caller returns only after the drain is complete.
    pub fn close(&self) -> Result<()> {
        {
            let mut sender = self.sender.write();
            if let Some(queue_tx) = sender.take() {
                *self.state.lock() = PipelineState::Closing;
                debug!(backlog = queue_tx.len(), "Buffered sink closing");
            }
        }

        let mut workers = self.workers.lock();
        if workers.is_empty() {
            return Ok(());
        }

        let mut result = Ok(());
        for worker in workers.drain(..) {
            let id = worker.id();
            if let Err(e) = worker.join() {
                warn!(worker = id, error = %e, "Worker failed to join cleanly");
                if result.is_ok() {
                    result = Err(e.into());
                }
            }
        }

        *self.state.lock() = PipelineState::Closed;

        info!(
            persisted = self.stats.persisted(),
            rejected = self.stats.rejected(),
            failed = self.stats.failed(),
            "Buffered sink closed"
        );

        result
    }

    pub fn state(&self) -> PipelineState {
        *self.state.lock()
    }

    /// Pipeline counters (the side channel for per-line failures)
    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Wrapped sink
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl<S: Sink + 'static> Sink for BufferedSink<S> {
    fn prefix(&self) -> &str {
        self.inner.prefix()
    }

    /// Enqueue one line
    ///
    /// Blocks only while the queue is full. Returns `raw.len()` once queued;
    /// whether the line is later persisted is not reported here.
    fn write(&self, raw: &[u8]) -> Result<usize> {
        let sender = self.sender.read();
        let queue_tx = sender.as_ref().ok_or(PipelineError::Closed)?;
        queue_tx.send(raw.to_vec())?;
        Ok(raw.len())
    }
}

impl<S: Sink + 'static> Drop for BufferedSink<S> {
    fn drop(&mut self) {
        if self.state() != PipelineState::Closed {
            if let Err(e) = self.close() {
                warn!(error = %e, "Buffered sink did not close cleanly");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, DbError, LoggerError, ParseError};
    use std::collections::HashSet;
    use std::time::Duration;

    /// In-memory sink that rejects lines without a tab and fails on "boom"
    struct MemorySink {
        lines: Mutex<Vec<String>>,
        delay: Duration,
    }

    impl MemorySink {
        fn new() -> Self {
            Self::with_delay(Duration::ZERO)
        }

        fn with_delay(delay: Duration) -> Self {
            Self {
                lines: Mutex::new(Vec::new()),
                delay,
            }
        }
    }

    impl Sink for MemorySink {
        fn prefix(&self) -> &str {
            "MEM"
        }

        fn write(&self, raw: &[u8]) -> Result<usize> {
            std::thread::sleep(self.delay);
            let line = String::from_utf8_lossy(raw).to_string();
            if !line.contains('\t') {
                return Err(ParseError::InvalidLog.into());
            }
            if line.contains("boom") {
                return Err(DbError::Schema("backend down".into()).into());
            }
            self.lines.lock().push(line);
            Ok(raw.len())
        }
    }

    fn config(queue_capacity: usize, worker_count: usize) -> PipelineConfig {
        PipelineConfig {
            queue_capacity,
            worker_count,
        }
    }

    #[test]
    fn test_close_drains_everything() {
        let sink = BufferedSink::new(MemorySink::new(), config(4, 3)).unwrap();
        assert_eq!(sink.state(), PipelineState::Open);

        for i in 0..200 {
            let line = format!("MEM\tline {}", i);
            assert_eq!(sink.write(line.as_bytes()).unwrap(), line.len());
        }

        sink.close().unwrap();
        assert_eq!(sink.state(), PipelineState::Closed);

        let lines = sink.inner().lines.lock();
        assert_eq!(lines.len(), 200);

        let unique: HashSet<&String> = lines.iter().collect();
        assert_eq!(unique.len(), 200);
        assert_eq!(sink.stats().persisted(), 200);
    }

    #[test]
    fn test_errors_are_counted_not_returned() {
        let sink = BufferedSink::new(MemorySink::new(), config(8, 2)).unwrap();

        assert!(sink.write(b"MEM\tgood").is_ok());
        assert!(sink.write(b"no tab at all").is_ok());
        assert!(sink.write(b"MEM\tboom").is_ok());
        assert!(sink.write(b"MEM\talso good").is_ok());

        sink.close().unwrap();

        assert_eq!(sink.inner().lines.lock().len(), 2);
        assert_eq!(sink.stats().persisted(), 2);
        assert_eq!(sink.stats().rejected(), 1);
        assert_eq!(sink.stats().failed(), 1);
        assert_eq!(sink.stats().dropped(), 2);
    }

    #[test]
    fn test_write_after_close_fails() {
        let sink = BufferedSink::with_defaults(MemorySink::new()).unwrap();
        sink.close().unwrap();

        let err = sink.write(b"MEM\tlate").unwrap_err();
        assert!(matches!(err, LoggerError::Pipeline(PipelineError::Closed)));
    }

    #[test]
    fn test_close_is_idempotent() {
        let sink = BufferedSink::new(MemorySink::new(), config(2, 1)).unwrap();
        sink.write(b"MEM\tonce").unwrap();

        sink.close().unwrap();
        sink.close().unwrap();
        assert_eq!(sink.state(), PipelineState::Closed);
        assert_eq!(sink.inner().lines.lock().len(), 1);
    }

    #[test]
    fn test_concurrent_close_waits_for_drain() {
        let sink = Arc::new(
            BufferedSink::new(
                MemorySink::with_delay(Duration::from_millis(5)),
                config(32, 1),
            )
            .unwrap(),
        );

        for i in 0..30 {
            sink.write(format!("MEM\t{}", i).as_bytes()).unwrap();
        }

        let closers: Vec<_> = (0..2)
            .map(|_| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    sink.close().unwrap();
                    (sink.inner().lines.lock().len(), sink.state())
                })
            })
            .collect();

        for closer in closers {
            let (persisted, state) = closer.join().unwrap();
            assert_eq!(persisted, 30);
            assert_eq!(state, PipelineState::Closed);
        }
        assert_eq!(sink.stats().persisted(), 30);
    }

    #[test]
    fn test_concurrent_producers_with_backpressure() {
        let sink = Arc::new(
            BufferedSink::new(
                MemorySink::with_delay(Duration::from_millis(1)),
                config(1, 2),
            )
            .unwrap(),
        );

        let producers: Vec<_> = (0..4)
            .map(|p| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        sink.write(format!("MEM\t{}-{}", p, i).as_bytes()).unwrap();
                    }
                })
            })
            .collect();

        for producer in producers {
            producer.join().unwrap();
        }

        sink.close().unwrap();
        assert_eq!(sink.inner().lines.lock().len(), 100);
        assert!(sink.stats().backpressure_count() > 0);
    }

    #[test]
    fn test_drop_drains_queue() {
        let inner = Arc::new(MemorySink::with_delay(Duration::from_millis(2)));

        {
            let sink = BufferedSink::new(Arc::clone(&inner), config(16, 2)).unwrap();
            for i in 0..10 {
                sink.write(format!("MEM\t{}", i).as_bytes()).unwrap();
            }
        }

        assert_eq!(inner.lines.lock().len(), 10);
    }

    #[test]
    fn test_prefix_comes_from_inner_sink() {
        let sink = BufferedSink::with_defaults(MemorySink::new()).unwrap();
        assert_eq!(sink.prefix(), "MEM");
        assert_eq!(sink.config().queue_capacity, 50);
        assert_eq!(sink.config().worker_count, 10);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = BufferedSink::new(MemorySink::new(), config(0, 1)).err().unwrap();
        assert!(matches!(
            err,
            LoggerError::Config(ConfigError::InvalidQueueCapacity { .. })
        ));

        let err = BufferedSink::new(MemorySink::new(), config(1, 0)).err().unwrap();
        assert!(matches!(
            err,
            LoggerError::Config(ConfigError::InvalidWorkerCount { .. })
        ));
    }
}
