use serde::{Deserialize, Serialize};
use serde_json::Value;
use vista_common::{PanelId, StoreError};

use crate::types::{ExtensionInfo, WebviewOptions};

/// Durable snapshot of a live panel, keyed by panel id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPanelRecord {
    pub id: PanelId,
    pub view_type: String,
    pub view_column: i32,
    pub extension_info: ExtensionInfo,
    pub webview_options: WebviewOptions,
    pub title: String,
}

impl PersistedPanelRecord {
    pub fn to_value(&self) -> Result<Value, StoreError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_records_written_with_camel_case_keys() {
        let value = json!({
            "id": "p1",
            "viewType": "markdown.preview",
            "viewColumn": 2,
            "extensionInfo": { "id": "vscode.markdown", "isBuiltin": true },
            "webviewOptions": { "enableScripts": true },
            "title": "Preview README.md"
        });
        let record = PersistedPanelRecord::from_value(value).unwrap();
        assert_eq!(record.id, PanelId::from("p1"));
        assert_eq!(record.view_column, 2);
        assert!(record.extension_info.is_builtin);
        assert!(record.webview_options.enable_scripts);

        let back = record.to_value().unwrap();
        assert_eq!(back["viewType"], "markdown.preview");
        assert_eq!(back["extensionInfo"]["id"], "vscode.markdown");
    }

    #[test]
    fn rejects_malformed_record() {
        let err = PersistedPanelRecord::from_value(json!({"id": 5})).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
