use super::LogType;
use crate::app::{ConfigError, LoggingError};
use crate::cef::MappingError;
use crate::consumer::{ConsumerError, ProfileError};
use crate::producer::ProducerError;
use crate::reliability::CheckpointError;
use crate::sender::TransportError;
use thiserror::Error;

/// Top-level error type for the forwarder.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Mapping table error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Producer error: {0}")]
    Producer(#[from] ProducerError),

    #[error("Consumer profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("{log_type} consumer{} failed: {source}", account_suffix(.account_id))]
    ConsumerFailed {
        log_type: LogType,
        account_id: Option<String>,
        #[source]
        source: ConsumerError,
    },

    #[error("Task for {0} ended abnormally: {1}")]
    Task(String, String),
}

fn account_suffix(account_id: &Option<String>) -> String {
    account_id
        .as_deref()
        .map(|id| format!(" (account {id})"))
        .unwrap_or_default()
}

impl SyncError {
    /// Whether this error came out of a running consumer, as opposed to startup.
    pub fn is_delivery_failure(&self) -> bool {
        matches!(self, SyncError::ConsumerFailed { .. })
    }
}
