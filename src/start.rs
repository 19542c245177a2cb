//! Process startup: logging, configuration, runtime and graceful shutdown.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;

use crate::config::WorkerConfig;
use crate::server::{self, AppState};

/// Run the worker until Ctrl-C.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting content AI worker v{}", env!("CARGO_PKG_VERSION"));

    let state = match initialize() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server_with_shutdown(state, shutdown_signal())) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("worker stopped");
    ExitCode::SUCCESS
}

/// Load configuration from the environment and build the shared state.
///
/// # Errors
/// Returns an error if configuration is invalid or a client cannot be built.
pub fn initialize() -> anyhow::Result<Arc<AppState>> {
    let config = WorkerConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        port = config.port,
        backend = ?config.cms.backend,
        llm = %config.llm.base_url,
        mock = config.mock_mode,
        "configuration loaded"
    );
    AppState::new(config).context("Failed to create state")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
