use crate::consumer::LogFormat;
use crate::domain::LogType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    pub directory: PathBuf,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("/tmp/duo-log-sync/checkpoints"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    pub format: LogFormat,
    /// Batches buffered between a producer and its consumer.
    pub queue_capacity: usize,
    pub batch_size: usize,
    #[serde(rename = "poll_interval_ms", with = "super::duration_ms")]
    pub poll_interval: Duration,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            queue_capacity: 8,
            batch_size: 100,
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// One log stream to forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub log_type: LogType,
    pub path: PathBuf,
    #[serde(default)]
    pub account_id: Option<String>,
}
