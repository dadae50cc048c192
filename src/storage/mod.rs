//! Key-value persistence gateway.
//!
//! The engine's collaborators see storage as the extension storage API:
//! JSON values under string keys, with a process-wide change subscription
//! used to re-render any open list UI. Two backends implement the contract:
//! [`MemoryGateway`] for volatile sessions and tests, and [`SqliteGateway`]
//! for durable storage.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryGateway;
pub use sqlite::SqliteGateway;

use serde_json::Value;

use crate::types::errors::StorageError;

/// Callback invoked with the changed key after every successful mutation.
pub type ChangeListener = Box<dyn Fn(&str)>;

/// The persistence contract the rest of the engine depends on.
pub trait StorageGateway {
    /// Reads the value stored under `key`, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    /// Overwrites the value stored under `key`.
    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError>;
    /// Deletes `key`. Deleting an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
    /// Registers a listener notified with the key after each change.
    fn subscribe(&mut self, listener: ChangeListener);
}
