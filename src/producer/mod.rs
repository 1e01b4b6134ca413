//! Reference producer: feeds consumer queues from NDJSON files and keeps the
//! per-batch offsets the consumer checkpoints.

pub mod cursor;
pub mod ndjson;

pub use cursor::BatchCursor;
pub use ndjson::{NdjsonProducer, ProducerError, ProducerSettings};
