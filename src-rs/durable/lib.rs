//! In-process durable execution: named callables, named dependencies and a
//! promise store, served over HTTP.

pub mod context;
pub mod deps;
pub mod handlers;
pub mod registry;
pub mod runtime;
pub mod store;
pub mod types;

pub use context::Context;
pub use deps::Dependencies;
pub use registry::FunctionRegistry;
pub use runtime::{Durable, DurableBuilder};
pub use store::PromiseStore;
pub use types::{FunctionFuture, FunctionHandler, Promise, PromiseState};
