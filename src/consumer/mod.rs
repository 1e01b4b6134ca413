//! The consumer side of the pipeline: queue → serializer → transport →
//! checkpoint, one instance per (log type, child account).

pub mod pipeline;
pub mod profile;
pub mod serializer;

pub use pipeline::{
    BatchReport, Consumer, ConsumerError, ConsumerExit, ConsumerState, LogBatch, OffsetResolver,
};
pub use profile::{ConsumerProfile, ProfileError};
pub use serializer::{LogFormat, RecordSerializer};
