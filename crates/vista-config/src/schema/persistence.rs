//! Panel metadata and content-state persistence settings.

use serde::{Deserialize, Serialize};

/// Storage namespaces and the content-state coalescing window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Minimum interval between content-state writes per view type
    /// (valid range: 50-60000).
    pub state_flush_interval_ms: u64,
    /// Namespace holding one metadata record per live panel.
    pub panel_namespace: String,
    /// Prefix of the per-view-type content-state namespaces.
    pub state_namespace_prefix: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            state_flush_interval_ms: 500,
            panel_namespace: "extension-webview-panels".into(),
            state_namespace_prefix: "extension-webview/".into(),
        }
    }
}

/// Content-state namespace of `view_type` under `prefix`.
pub fn state_namespace(prefix: &str, view_type: &str) -> String {
    format!("{prefix}{view_type}")
}
