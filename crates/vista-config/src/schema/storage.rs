//! Storage backend location.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the JSON file store. `None` uses the platform data dir.
    pub directory: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the storage directory, falling back to `<data_dir>/vista/storage`.
    pub fn resolved_directory(&self) -> Option<PathBuf> {
        self.directory
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("vista").join("storage")))
    }
}
