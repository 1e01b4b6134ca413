use super::{Config, ConfigError};
use std::collections::HashSet;

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transport.host.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "Transport host must not be empty".to_string(),
            ));
        }

        if self.transport.port == 0 {
            return Err(ConfigError::InvalidConfig(
                "Transport port must be greater than 0".to_string(),
            ));
        }

        if self.transport.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "Connect timeout must be greater than 0".to_string(),
            ));
        }

        if self.logs.batch_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        if self.logs.queue_capacity == 0 {
            return Err(ConfigError::InvalidConfig(
                "Queue capacity must be greater than 0".to_string(),
            ));
        }

        if self.sources.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "At least one [[sources]] entry is required".to_string(),
            ));
        }

        // Each (log type, account) pair owns one checkpoint file.
        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.account_id.is_some() && !source.log_type.accepts_account_id() {
                return Err(ConfigError::InvalidConfig(format!(
                    "{} logs do not support account_id",
                    source.log_type
                )));
            }

            if matches!(source.account_id.as_deref(), Some(id) if id.trim().is_empty()) {
                return Err(ConfigError::InvalidConfig(format!(
                    "Empty account_id for {} source",
                    source.log_type
                )));
            }

            if let Some(id) = source.account_id.as_deref().filter(|id| !is_file_name_safe(id)) {
                return Err(ConfigError::InvalidConfig(format!(
                    "account_id '{id}' for {} source may only contain letters, digits, '-' and '_'",
                    source.log_type
                )));
            }

            if !seen.insert((source.log_type, source.account_id.clone())) {
                return Err(ConfigError::InvalidConfig(format!(
                    "Duplicate source for {}{}",
                    source.log_type,
                    source
                        .account_id
                        .as_deref()
                        .map(|id| format!(" account {id}"))
                        .unwrap_or_default()
                )));
            }
        }

        Ok(())
    }
}

/// Account ids become part of checkpoint file names and must map to them
/// one-to-one.
fn is_file_name_safe(account_id: &str) -> bool {
    account_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
