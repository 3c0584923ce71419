use std::net::SocketAddr;

use tracing::info;

use crate::api::host::Host;
use crate::error::ServerError;

pub struct WorkerServer {
    pub port: u16,
    pub host: Host,
}

impl WorkerServer {
    pub fn new(port: u16, host: Host) -> Self {
        Self { port, host }
    }

    pub async fn start(&self) -> Result<(), ServerError> {
        let app = self.host.router()?;

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!(%addr, mode = %self.host.mode(), "research-worker listening");
        axum::Server::bind(&addr)
            .serve(app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| ServerError::Serve(err.to_string()))
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
