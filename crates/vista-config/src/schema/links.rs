//! Link handling for webview content.

use serde::{Deserialize, Serialize};

/// Schemes opened directly when clicked inside a webview.
///
/// `command:` links are not listed here; they depend on the panel's
/// options and the command permission policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub standard_schemes: Vec<String>,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            standard_schemes: vec!["http".into(), "https".into(), "mailto".into()],
        }
    }
}
