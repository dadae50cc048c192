//! In-memory storage gateway.
//!
//! Mirrors the session-scoped half of the extension storage API. Used as
//! the default backend in tests and for pages where durable storage is
//! unavailable.

use std::collections::HashMap;

use serde_json::Value;

use super::{ChangeListener, StorageGateway};
use crate::types::errors::StorageError;

#[derive(Default)]
pub struct MemoryGateway {
    values: HashMap<String, Value>,
    listeners: Vec<ChangeListener>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&self, key: &str) {
        for listener in &self.listeners {
            listener(key);
        }
    }
}

impl StorageGateway for MemoryGateway {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value);
        self.notify(key);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.values.remove(key).is_some() {
            self.notify(key);
        }
        Ok(())
    }

    fn subscribe(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }
}
