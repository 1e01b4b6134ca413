use super::groups::{CheckpointConfig, LogsConfig, SourceConfig};
use super::env::override_from_env;
use super::{ConfigError, LogLevel};
use crate::sender::TransportConfig;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Command line surface of the binary. Everything else lives in the TOML file.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Forward Duo logs to a SIEM over syslog", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', env = "DUOLOGSYNC_CONFIG")]
    pub config: PathBuf,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse without consulting the environment or validating.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Connection details can be overridden per deployment without editing
    /// the file.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        override_from_env("DUOLOGSYNC_SERVER_HOST", &mut self.transport.host)?;
        override_from_env("DUOLOGSYNC_SERVER_PORT", &mut self.transport.port)?;
        override_from_env("DUOLOGSYNC_CHECKPOINT_DIR", &mut self.checkpoint.directory)?;
        Ok(())
    }
}
