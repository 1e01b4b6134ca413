//! Domain layer for duo-log-sync.
//!
//! Contains the canonical types shared across all modules:
//! - `LogRecord` / `Lookup`: the nested record and path lookup result
//! - `LogType`: which Duo log stream a record belongs to
//! - `Offset`: durable resume point for a stream
//! - `SyncError`: top-level error type

pub mod error;
pub mod log_record;
pub mod log_type;
pub mod offset;

pub use error::SyncError;
pub use log_record::{LogRecord, Lookup};
pub use log_type::LogType;
pub use offset::{Offset, event_time_millis};
