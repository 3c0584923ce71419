use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Named values made available to callables at execution time.
#[derive(Clone, Default)]
pub struct Dependencies {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `name`, replacing any earlier value.
    pub fn set<T: Any + Send + Sync>(&mut self, name: &str, value: T) {
        self.values.insert(name.to_string(), Arc::new(value));
    }

    /// Looks up `name` and downcasts it to `T`. A value registered under a
    /// different type reads as absent.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        let value = self.values.get(name)?.clone();
        value.downcast::<T>().ok()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
