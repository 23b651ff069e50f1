//! Worker thread logic for the buffered sink
//!
//! Each worker:
//! - Pulls raw lines from the shared queue
//! - Hands them to the wrapped sink (parse + persist)
//! - Counts and logs failures instead of returning them
//! - Exits once the queue is disconnected and drained

use crate::error::PipelineError;
use crate::pipeline::queue::{LineReceiver, PipelineStats};
use crate::sink::Sink;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

/// A worker thread draining the line queue into a sink
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<u64>>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn<S: Sink + 'static>(
        id: usize,
        queue_rx: LineReceiver,
        sink: Arc<S>,
        stats: Arc<PipelineStats>,
    ) -> Result<Self, PipelineError> {
        let handle = thread::Builder::new()
            .name(format!("sink-worker-{}", id))
            .spawn(move || worker_loop(id, queue_rx, sink, stats))
            .map_err(|e| PipelineError::SpawnFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Wait for the worker to finish draining
    ///
    /// Returns the number of lines this worker handled.
    pub fn join(mut self) -> Result<u64, PipelineError> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| PipelineError::WorkerPanicked { id: self.id }),
            None => Ok(0),
        }
    }
}

/// Main worker loop
fn worker_loop<S: Sink>(
    id: usize,
    queue_rx: LineReceiver,
    sink: Arc<S>,
    stats: Arc<PipelineStats>,
) -> u64 {
    debug!(worker = id, prefix = sink.prefix(), "Worker starting");

    let mut handled = 0u64;

    while let Some(line) = queue_rx.recv() {
        handled += 1;

        match sink.write(&line) {
            Ok(bytes) => {
                stats.record_persisted();
                trace!(worker = id, bytes = bytes, "Line persisted");
            }
            Err(e) if e.is_parse_error() => {
                stats.record_rejected();
                warn!(worker = id, error = %e, "Dropped unparseable log line");
            }
            Err(e) => {
                stats.record_failed();
                warn!(worker = id, error = %e, "Failed to persist log line");
            }
        }
    }

    debug!(worker = id, lines = handled, "Worker shutting down");

    handled
}
