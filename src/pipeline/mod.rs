//! Buffered write path
//!
//! ```text
//!  Logger::print ──▶ BufferedSink::write ──▶ LineQueue (bounded)
//!                                               │
//!                         ┌─────────────────────┼─────────────────────┐
//!                         ▼                     ▼                     ▼
//!                    sink-worker-0         sink-worker-1   ...   sink-worker-N
//!                         │                     │                     │
//!                         └──────── inner Sink (parse + persist) ─────┘
//! ```
//!
//! Per-line failures on the workers are logged and counted in
//! [`PipelineStats`]; they are never returned to the writer.

pub mod buffered;
pub mod queue;
pub mod worker;

pub use buffered::{BufferedSink, PipelineState};
pub use queue::{line_queue, LineReceiver, LineSender, PipelineStats};
pub use worker::Worker;
