pub mod config;
pub mod error;
pub mod helpers;
pub mod research;

#[path = "llm/lib.rs"]
pub mod llm;
#[path = "durable/lib.rs"]
pub mod durable;
#[path = "api/lib.rs"]
pub mod api;

pub use config::{EnvMap, HostMode, ServerConfig, WorkerConfig};
pub use durable::{Context, Durable, Promise, PromiseState, PromiseStore};
pub use error::{BootstrapError, DispatchError, ServerError};
pub use helpers::bootstrap;
