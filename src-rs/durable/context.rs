use std::any::Any;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde_json::Value;

use super::runtime::Runtime;
use super::types::PromiseState;

/// Handle given to a callable for the duration of one invocation.
///
/// Cloning is cheap; clones share the child-invocation counter so ids stay
/// deterministic across the whole execution.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    id: String,
    func: String,
    runtime: Arc<Runtime>,
    children: AtomicU32,
}

impl Context {
    pub(crate) fn new(id: &str, func: &str, runtime: Arc<Runtime>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                id: id.to_string(),
                func: func.to_string(),
                runtime,
                children: AtomicU32::new(0),
            }),
        }
    }

    /// Id of the promise this execution settles.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn func(&self) -> &str {
        &self.inner.func
    }

    pub fn dependency<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.inner.runtime.dependencies().get::<T>(name)
    }

    /// Invokes a registered function as a durable child of this execution.
    ///
    /// The child gets the id `<parent id>.<n>`; if that promise already
    /// completed it is replayed rather than executed again.
    pub async fn run(&self, func: &str, args: Value) -> Result<Value, String> {
        let n = self.inner.children.fetch_add(1, Ordering::SeqCst) + 1;
        let child_id = format!("{}.{}", self.inner.id, n);
        let promise = self
            .inner
            .runtime
            .clone()
            .invoke(&child_id, func, args)
            .await
            .map_err(|err| err.to_string())?;
        match promise.state {
            PromiseState::Resolved => Ok(promise.value.unwrap_or(Value::Null)),
            PromiseState::Rejected => Err(promise.error.unwrap_or_else(|| "unknown error".to_string())),
            PromiseState::Pending => Err(format!("promise {} did not settle", child_id)),
        }
    }
}
