use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower::ServiceExt;
use tracing::{error, info};

use crate::config::{EnvMap, HostMode};
use crate::durable::PromiseStore;
use crate::error::BootstrapError;
use crate::helpers::{bootstrap, process_env, ClientFactory};

/// Where a host reads its configuration from.
pub trait EnvSource: Send + Sync {
    fn snapshot(&self) -> EnvMap;
}

pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn snapshot(&self) -> EnvMap {
        process_env()
    }
}

impl<F> EnvSource for F
where
    F: Fn() -> EnvMap + Send + Sync,
{
    fn snapshot(&self) -> EnvMap {
        self()
    }
}

/// Adapts [`bootstrap`] to a hosting model.
///
/// In [`HostMode::Process`] the context is built once, when the router is
/// built. In [`HostMode::PerRequest`] every request takes a fresh snapshot
/// and gets its own client, dependencies and registry; only the promise
/// store is shared.
#[derive(Clone)]
pub struct Host {
    mode: HostMode,
    env: Arc<dyn EnvSource>,
    store: Arc<PromiseStore>,
    factory: ClientFactory,
}

impl Host {
    pub fn new(mode: HostMode, env: Arc<dyn EnvSource>, factory: ClientFactory) -> Self {
        Self {
            mode,
            env,
            store: Arc::new(PromiseStore::new()),
            factory,
        }
    }

    pub fn mode(&self) -> HostMode {
        self.mode
    }

    pub fn router(&self) -> Result<Router, BootstrapError> {
        match self.mode {
            HostMode::Process => {
                let durable = bootstrap(&self.env.snapshot(), self.store.clone(), &self.factory)?;
                info!(functions = ?durable.functions().names(), "execution context ready");
                Ok(durable.handler_http())
            }
            HostMode::PerRequest => Ok(Router::new().fallback(handle_per_request).with_state(self.clone())),
        }
    }
}

async fn handle_per_request(State(host): State<Host>, req: Request<Body>) -> Response {
    let durable = match bootstrap(&host.env.snapshot(), host.store.clone(), &host.factory) {
        Ok(durable) => durable,
        Err(err) => {
            error!(error = %err, uri = %req.uri(), "bootstrap failed");
            return err.into_response();
        }
    };
    match durable.handler_http().oneshot(req).await {
        Ok(resp) => resp,
        Err(never) => match never {},
    }
}
