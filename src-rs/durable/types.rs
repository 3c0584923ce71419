use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::context::Context;

pub type FunctionFuture = Pin<Box<dyn Future<Output = Result<Value, String>> + Send>>;

/// A callable the delegate can dispatch to by name.
pub type FunctionHandler = Arc<dyn Fn(Context, Value) -> FunctionFuture + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromiseState {
    Pending,
    Resolved,
    Rejected,
}

/// Durable record of one invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Promise {
    pub id: String,
    pub func: String,
    pub args: Value,
    pub state: PromiseState,
    pub value: Option<Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Promise {
    pub fn is_completed(&self) -> bool {
        matches!(self.state, PromiseState::Resolved | PromiseState::Rejected)
    }
}
