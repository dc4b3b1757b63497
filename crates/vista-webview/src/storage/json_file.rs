//! File-backed storage: one JSON object per namespace.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex};

use async_trait::async_trait;
use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;
use vista_common::StoreError;

use super::{ScopedStore, StorageProvider};

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9.\-]").expect("static file-name regex must compile"));

/// Map a namespace to a file name. Every byte outside `[A-Za-z0-9.-]` is
/// escaped as `_xx`, so distinct namespaces never share a file.
pub(crate) fn namespace_file_name(namespace: &str) -> String {
    let escaped = UNSAFE_FILE_CHARS.replace_all(namespace, |caps: &Captures| {
        caps[0]
            .bytes()
            .map(|b| format!("_{b:02x}"))
            .collect::<String>()
    });
    format!("{escaped}.json")
}

/// Storage rooted at a directory.
pub struct JsonFileStorage {
    directory: PathBuf,
    open: Mutex<HashMap<String, Arc<JsonFileStore>>>,
}

impl JsonFileStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            open: Mutex::new(HashMap::new()),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl StorageProvider for JsonFileStorage {
    async fn open(&self, namespace: &str) -> Result<Arc<dyn ScopedStore>, StoreError> {
        let mut open = self.open.lock().unwrap();
        let store = open.entry(namespace.to_string()).or_insert_with(|| {
            Arc::new(JsonFileStore {
                namespace: namespace.to_string(),
                path: self.directory.join(namespace_file_name(namespace)),
                entries: tokio::sync::Mutex::new(None),
            })
        });
        Ok(Arc::clone(store) as Arc<dyn ScopedStore>)
    }
}

struct JsonFileStore {
    namespace: String,
    path: PathBuf,
    /// Lazily loaded file contents; the lock also serializes file writes.
    entries: tokio::sync::Mutex<Option<BTreeMap<String, Value>>>,
}

impl JsonFileStore {
    async fn load(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(StoreError::Corrupt {
                namespace: self.namespace.clone(),
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    async fn persist(&self, entries: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(namespace = %self.namespace, entries = entries.len(), "store persisted");
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl ScopedStore for JsonFileStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        Ok(guard.as_ref().and_then(|m| m.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut guard = self.entries.lock().await;
        let mut entries = match guard.take() {
            Some(entries) => entries,
            None => self.load().await?,
        };
        entries.insert(key.to_string(), value);
        let result = self.persist(&entries).await;
        *guard = Some(entries);
        result
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut guard = self.entries.lock().await;
        let mut entries = match guard.take() {
            Some(entries) => entries,
            None => self.load().await?,
        };
        let existed = entries.remove(key).is_some();
        let result = if existed {
            self.persist(&entries).await
        } else {
            Ok(())
        };
        *guard = Some(entries);
        result
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        Ok(guard
            .as_ref()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default())
    }
}
