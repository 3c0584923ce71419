use std::any::Any;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::DispatchError;

use super::context::Context;
use super::deps::Dependencies;
use super::handlers::{handle_health, handle_invoke, handle_promise, handle_promises};
use super::registry::FunctionRegistry;
use super::store::{next_id, wait_settled, Claim, PromiseStore};
use super::types::{FunctionHandler, Promise};

pub(crate) struct Runtime {
    functions: FunctionRegistry,
    dependencies: Dependencies,
    store: Arc<PromiseStore>,
}

impl Runtime {
    pub(crate) fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    pub(crate) async fn invoke(self: Arc<Self>, id: &str, func: &str, args: Value) -> Result<Promise, DispatchError> {
        if let Some(existing) = self.store.get(id) {
            if existing.is_completed() {
                info!(id, func, "replaying completed promise");
                return Ok(existing);
            }
        }

        let handler = self.functions.get(func)?;
        loop {
            let execution = match self.store.claim(id, func, args.clone()) {
                Claim::Settled(promise) => {
                    info!(id, func, "replaying completed promise");
                    return Ok(promise);
                }
                Claim::Running(running) => {
                    info!(id, func, "joining running promise");
                    match wait_settled(running).await {
                        Some(promise) => return Ok(promise),
                        // owner vanished; claim again
                        None => continue,
                    }
                }
                Claim::Owned(execution) => execution,
            };

            info!(id, func, "invoking function");
            let ctx = Context::new(id, func, self.clone());
            let outcome = handler(ctx, args).await;
            if let Err(err) = &outcome {
                warn!(id, func, error = %err, "function rejected");
            }
            return Ok(self.store.settle(execution, outcome));
        }
    }
}

/// Collects dependencies and callables, then freezes them into a [`Durable`].
pub struct DurableBuilder {
    functions: FunctionRegistry,
    dependencies: Dependencies,
    store: Arc<PromiseStore>,
}

impl DurableBuilder {
    pub fn new(store: Arc<PromiseStore>) -> Self {
        Self {
            functions: FunctionRegistry::new(),
            dependencies: Dependencies::new(),
            store,
        }
    }

    pub fn dependency<T: Any + Send + Sync>(mut self, name: &str, value: T) -> Self {
        self.dependencies.set(name, value);
        self
    }

    pub fn register(mut self, name: &str, handler: FunctionHandler) -> Result<Self, DispatchError> {
        self.functions.register(name, handler)?;
        Ok(self)
    }

    pub fn build(self) -> Durable {
        Durable {
            runtime: Arc::new(Runtime {
                functions: self.functions,
                dependencies: self.dependencies,
                store: self.store,
            }),
        }
    }
}

/// An execution context: frozen callables and dependencies over a shared
/// promise store.
#[derive(Clone)]
pub struct Durable {
    runtime: Arc<Runtime>,
}

impl Durable {
    pub fn builder(store: Arc<PromiseStore>) -> DurableBuilder {
        DurableBuilder::new(store)
    }

    /// Runs `func` under promise `id`, generating an id when none is given.
    pub async fn invoke(&self, id: Option<String>, func: &str, args: Value) -> Result<Promise, DispatchError> {
        let id = id.filter(|id| !id.trim().is_empty()).unwrap_or_else(|| next_id(func));
        self.runtime.clone().invoke(&id, func, args).await
    }

    pub fn promise(&self, id: &str) -> Option<Promise> {
        self.runtime.store.get(id)
    }

    pub fn promises(&self, limit: usize) -> Vec<Promise> {
        self.runtime.store.list(limit)
    }

    pub fn dependency<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.runtime.dependencies.get::<T>(name)
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.runtime.functions
    }

    pub fn handler_http(&self) -> Router {
        Router::new()
            .route("/health", get(handle_health))
            .route("/invoke", post(handle_invoke))
            .route("/promises", get(handle_promises))
            .route("/promises/:id", get(handle_promise))
            .with_state(self.clone())
    }
}
