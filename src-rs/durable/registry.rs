use std::collections::HashMap;

use crate::error::DispatchError;

use super::types::FunctionHandler;

#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionHandler>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, handler: FunctionHandler) -> Result<(), DispatchError> {
        if name.trim().is_empty() {
            return Err(DispatchError::EmptyName);
        }
        if self.functions.contains_key(name) {
            return Err(DispatchError::AlreadyRegistered(name.to_string()));
        }
        self.functions.insert(name.to_string(), handler);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<FunctionHandler, DispatchError> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| DispatchError::FunctionNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn count(&self) -> usize {
        self.functions.len()
    }
}
