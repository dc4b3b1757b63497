//! Scoped key-value storage used for panel records and content state.
//!
//! Backends implement [`StorageProvider`]; each namespace is an independent
//! [`ScopedStore`] of JSON values keyed by panel id.

mod json_file;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use vista_common::StoreError;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;

/// One namespace of a key-value store.
#[async_trait]
pub trait ScopedStore: Send + Sync {
    fn namespace(&self) -> &str;
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
    async fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Opens namespaces. Opening the same namespace twice yields the same store.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    async fn open(&self, namespace: &str) -> Result<Arc<dyn ScopedStore>, StoreError>;
}
