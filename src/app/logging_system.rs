use super::config::LogLevel;
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoggingError {
    #[error("Invalid directive '{input}': {reason}")]
    InvalidDirective { input: String, reason: String },
    #[error("Logging system initialization failed: {0}")]
    InitFailed(String),
}

/// Builds the `tracing` filter and installs the global subscriber.
pub struct LoggingSystem {
    directives: Arc<RwLock<Vec<String>>>,
    json: bool,
}

impl LoggingSystem {
    pub fn new(json: bool) -> Self {
        Self {
            directives: Arc::new(RwLock::new(Vec::new())),
            json,
        }
    }

    pub fn add_directive(&self, directive: &str) -> Result<(), LoggingError> {
        let parsed = directive
            .parse::<Directive>()
            .map_err(|e| LoggingError::InvalidDirective {
                input: directive.to_string(),
                reason: e.to_string(),
            })?;
        self.directives.write().push(parsed.to_string());
        Ok(())
    }

    /// Quiet the runtime's own chatter unless explicitly asked for.
    pub fn add_default_directives(&self) -> Result<(), LoggingError> {
        for directive in ["tokio=warn", "mio=warn"] {
            self.add_directive(directive)?;
        }
        Ok(())
    }

    pub fn build_filter_string(&self, default_level: LogLevel) -> String {
        let directives = self.directives.read();
        std::iter::once(default_level.as_str().to_string())
            .chain(directives.iter().cloned())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn directive_count(&self) -> usize {
        self.directives.read().len()
    }

    /// `RUST_LOG`, when set, replaces the configured filter entirely.
    pub fn initialize_tracing(&self, default_level: LogLevel) -> Result<(), LoggingError> {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => {
                let filter_string = self.build_filter_string(default_level);
                EnvFilter::try_new(&filter_string).map_err(|e| {
                    LoggingError::InitFailed(format!("Bad filter '{filter_string}': {e}"))
                })?
            }
        };

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(self.json.then(|| fmt::layer().json().with_target(true)))
            .with((!self.json).then(|| fmt::layer().with_target(true).compact()));

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| LoggingError::InitFailed(e.to_string()))
    }
}

/// Install logging once per process; later calls return the first outcome.
pub fn setup_logging(level: LogLevel, json: bool) -> Result<(), LoggingError> {
    static INIT: OnceLock<Result<(), LoggingError>> = OnceLock::new();

    INIT.get_or_init(|| {
        let logging_system = LoggingSystem::new(json);
        logging_system.add_default_directives()?;
        logging_system.initialize_tracing(level)
    })
    .clone()
}
