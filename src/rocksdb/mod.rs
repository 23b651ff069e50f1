//! RocksDB storage module
//!
//! Embedded key-value backend for log records. Write-only from this crate's
//! point of view: there is no windowed query layer over it.
//!
//! # Module Structure
//!
//! - `schema`: key encoding, database options, `RocksHandle`
//! - `sink`: `RocksSink`, the parse-and-put sink

pub mod schema;
pub mod sink;

pub use schema::{encode_key, RocksHandle};
pub use sink::RocksSink;
