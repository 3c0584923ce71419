use std::process::ExitCode;
use std::sync::Arc;

use research_worker::api::{Host, ProcessEnv, WorkerServer};
use research_worker::config::ServerConfig;
use research_worker::helpers::{openai_client_factory, process_env};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match ServerConfig::from_env(&process_env()) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid server configuration");
            return ExitCode::FAILURE;
        }
    };

    let host = Host::new(config.mode, Arc::new(ProcessEnv), openai_client_factory());
    let server = WorkerServer::new(config.port, host);
    if let Err(err) = server.start().await {
        error!(error = %err, "research-worker stopped");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
