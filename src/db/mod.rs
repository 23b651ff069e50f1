//! SQLite storage module
//!
//! Relational backend for log records: one append-only `log` table, written by
//! [`SqliteSink`] and read back by [`LogStore`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │  SqliteSink (sync, caller)   │   │  BufferedSink workers (N)    │
//! │  parse -> INSERT             │   │  parse -> INSERT             │
//! └──────────────┬───────────────┘   └──────────────┬───────────────┘
//!                └─────────────┬────────────────────┘
//!                              ▼
//!               ┌──────────────────────────────┐
//!               │  SharedConnection            │
//!               │  Arc<Mutex<Connection>>      │
//!               └──────────────┬───────────────┘
//!                              ▼
//!               ┌──────────────────────────────┐
//!               │  LogStore                    │
//!               │  windowed SELECT / DELETE    │
//!               └──────────────────────────────┘
//! ```

pub mod schema;
pub mod sink;
pub mod store;

pub use schema::{create_database, open_database, open_in_memory, SharedConnection};
pub use sink::SqliteSink;
pub use store::LogStore;
