use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub struct CLIConfig {
    pub base_url: String,
    pub command: Command,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Research {
        topic: String,
        depth: u32,
        id: Option<String>,
    },
    Get {
        id: String,
    },
    List {
        limit: usize,
    },
    Help,
}

#[derive(Debug, Serialize)]
pub struct InvokeRequest {
    pub id: Option<String>,
    pub func: String,
    pub args: Value,
}

#[derive(Debug, Deserialize)]
pub struct PromiseInfo {
    pub id: String,
    pub func: String,
    pub state: String,
    pub value: Option<Value>,
    pub error: Option<String>,
    pub created_at: String,
}
