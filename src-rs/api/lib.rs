pub mod host;
pub mod server;

pub use host::{EnvSource, Host, ProcessEnv};
pub use server::WorkerServer;
