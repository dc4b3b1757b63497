use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use vista_common::StoreError;

use super::{ScopedStore, StorageProvider};

#[derive(Default)]
struct Namespace {
    entries: BTreeMap<String, Value>,
    writes: usize,
}

/// In-process storage. Contents are lost when the last clone is dropped.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    namespaces: Arc<Mutex<HashMap<String, Arc<Mutex<Namespace>>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn namespace(&self, name: &str) -> Arc<Mutex<Namespace>> {
        let mut namespaces = self.namespaces.lock().unwrap();
        Arc::clone(namespaces.entry(name.to_string()).or_default())
    }

    /// Number of `set` calls that reached `namespace`.
    pub fn write_count(&self, namespace: &str) -> usize {
        self.namespace(namespace).lock().unwrap().writes
    }

    /// Snapshot of a namespace's contents.
    pub fn snapshot(&self, namespace: &str) -> BTreeMap<String, Value> {
        self.namespace(namespace).lock().unwrap().entries.clone()
    }
}

struct MemoryStore {
    name: String,
    inner: Arc<Mutex<Namespace>>,
}

#[async_trait]
impl ScopedStore for MemoryStore {
    fn namespace(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.inner.lock().unwrap().entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut ns = self.inner.lock().unwrap();
        ns.entries.insert(key.to_string(), value);
        ns.writes += 1;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.lock().unwrap().entries.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.inner.lock().unwrap().entries.keys().cloned().collect())
    }
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    async fn open(&self, namespace: &str) -> Result<Arc<dyn ScopedStore>, StoreError> {
        Ok(Arc::new(MemoryStore {
            name: namespace.to_string(),
            inner: self.namespace(namespace),
        }))
    }
}
