//! Bounded line queue with backpressure
//!
//! Producers block on `send` while the queue is full. The queue disconnects
//! once every `LineSender` is dropped; receivers then drain what is left and
//! see `None`.

use crate::error::PipelineError;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the buffered pipeline
///
/// This is the only place per-line failures in the buffered path become
/// visible; the write call itself never reports them.
#[derive(Debug, Default)]
pub struct PipelineStats {
    /// Lines accepted into the queue
    pub enqueued: AtomicU64,

    /// Lines parsed and persisted
    pub persisted: AtomicU64,

    /// Lines dropped because they did not parse
    pub rejected: AtomicU64,

    /// Lines dropped because the backend returned an error
    pub failed: AtomicU64,

    /// Number of times a producer found the queue full
    pub backpressure_events: AtomicU64,
}

impl PipelineStats {
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    pub fn persisted(&self) -> u64 {
        self.persisted.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn backpressure_count(&self) -> u64 {
        self.backpressure_events.load(Ordering::Relaxed)
    }

    /// Lines dropped for any reason
    pub fn dropped(&self) -> u64 {
        self.rejected() + self.failed()
    }

    pub(crate) fn record_persisted(&self) {
        self.persisted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Create a bounded queue of raw lines
pub fn line_queue(capacity: usize, stats: Arc<PipelineStats>) -> (LineSender, LineReceiver) {
    let (sender, receiver) = bounded(capacity);
    (LineSender { sender, stats }, LineReceiver { receiver })
}

/// Producer side of the queue
#[derive(Clone)]
pub struct LineSender {
    sender: Sender<Vec<u8>>,
    stats: Arc<PipelineStats>,
}

impl LineSender {
    /// Enqueue a line, blocking while the queue is full
    pub fn send(&self, line: Vec<u8>) -> Result<(), PipelineError> {
        let line = match self.sender.try_send(line) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
            Err(TrySendError::Full(line)) => {
                self.stats.backpressure_events.fetch_add(1, Ordering::Relaxed);
                line
            }
            Err(TrySendError::Disconnected(_)) => return Err(PipelineError::Closed),
        };

        self.sender.send(line).map_err(|_| PipelineError::Closed)?;
        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Lines currently waiting
    pub(crate) fn len(&self) -> usize {
        self.sender.len()
    }
}

/// Consumer side of the queue (clone for each worker)
#[derive(Clone)]
pub struct LineReceiver {
    receiver: Receiver<Vec<u8>>,
}

impl LineReceiver {
    /// Receive the next line
    ///
    /// Blocks until a line is available. Returns `None` once every sender is
    /// gone and the queue is empty.
    pub fn recv(&self) -> Option<Vec<u8>> {
        self.receiver.recv().ok()
    }
}
