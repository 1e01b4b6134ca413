pub mod config;
pub mod logging_system;
pub mod service;
pub mod shutdown;

pub use config::{CheckpointConfig, Cli, Config, ConfigError, LogLevel, LogsConfig, SourceConfig};
pub use logging_system::{LoggingError, LoggingSystem, setup_logging};
pub use service::{Supervisor, SupervisorReport};
pub use shutdown::{spawn_signal_listener, wait_for_signal};

use crate::domain::SyncError;
use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

pub struct App {
    supervisor: Supervisor,
}

impl App {
    pub fn from_config(config: Config) -> Self {
        info!("Starting duo-log-sync v{}", crate::VERSION);
        info!(
            "Configuration: {} source(s), transport={:?} {}, format={:?}",
            config.sources.len(),
            config.transport.protocol,
            config.transport.address(),
            config.logs.format
        );
        Self {
            supervisor: Supervisor::new(config),
        }
    }

    /// Run until every consumer has stopped. Signals trigger a graceful drain.
    pub async fn run(self) -> Result<SupervisorReport, SyncError> {
        spawn_signal_listener(self.supervisor.cancellation_token());
        let result = self.supervisor.run().await;
        if matches!(&result, Err(e) if e.is_delivery_failure()) {
            error!("Delivery stopped; a restart resumes from the last checkpoint");
        }
        result
    }
}

async fn run_cli(cli: Cli) -> anyhow::Result<SupervisorReport> {
    let config = Config::from_file(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    let report = App::from_config(config).run().await?;
    Ok(report)
}

/// Binary entry point. Any fatal error maps to exit status 1.
pub async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.log_level, cli.log_json) {
        eprintln!("duo-log-sync: {e}");
        return ExitCode::FAILURE;
    }

    match run_cli(cli).await {
        Ok(report) => {
            info!(
                "duo-log-sync stopped: {} consumer(s), {} logs delivered",
                report.consumers, report.records
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("duo-log-sync exiting: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
