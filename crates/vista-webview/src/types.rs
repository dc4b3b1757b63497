//! Panel data model shared by the coordinator, persistence, and host seams.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column value meaning "not shown in any editor group".
pub const HIDDEN_COLUMN: i32 = -1;

/// `ViewColumn.Active` as sent by the extension host.
pub const VIEW_COLUMN_ACTIVE: i32 = -1;

/// `ViewColumn.Beside` as sent by the extension host.
pub const VIEW_COLUMN_BESIDE: i32 = -2;

/// URI of the editor tab hosting a panel's content.
///
/// Panels are matched against the layout by this identifier, never by
/// reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceUri(String);

impl ResourceUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceUri {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The extension that owns a panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_location: Option<String>,
    #[serde(default)]
    pub is_builtin: bool,
}

impl ExtensionInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Where and how to show a panel. Unset fields inherit on merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShowOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_column: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_focus: Option<bool>,
}

impl ShowOptions {
    pub fn in_column(view_column: i32) -> Self {
        Self {
            view_column: Some(view_column),
            preserve_focus: None,
        }
    }

    /// Overlay `other` on top of `self`; set fields of `other` win.
    pub fn merged(&self, other: &ShowOptions) -> ShowOptions {
        ShowOptions {
            view_column: other.view_column.or(self.view_column),
            preserve_focus: other.preserve_focus.or(self.preserve_focus),
        }
    }
}

/// Webview and panel options, persisted with the panel record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WebviewOptions {
    pub enable_scripts: bool,
    pub enable_command_uris: bool,
    pub retain_context_when_hidden: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub local_resource_roots: Vec<String>,
}

/// Theme-specific icon paths for a panel's tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconPath {
    pub light: String,
    pub dark: String,
    pub hc: String,
}

/// Editor group an `open` call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenTarget {
    /// The currently active group.
    Active,
    /// A new or existing group beside the active one.
    Beside,
    /// Zero-based group index.
    Group(usize),
}

/// Options for opening a panel's editor tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    pub target: OpenTarget,
    pub focus: bool,
}

impl OpenOptions {
    /// Convert extension-host show options into editor open options.
    pub fn from_show_options(options: &ShowOptions) -> Self {
        let target = match options.view_column {
            None | Some(VIEW_COLUMN_ACTIVE) => OpenTarget::Active,
            Some(VIEW_COLUMN_BESIDE) => OpenTarget::Beside,
            Some(n) if n >= 1 => OpenTarget::Group((n - 1) as usize),
            Some(_) => OpenTarget::Active,
        };
        Self {
            target,
            focus: !options.preserve_focus.unwrap_or(false),
        }
    }
}

/// Observable projection of a panel onto the editor layout.
///
/// `position` is the 1-based column of the group showing the panel, or
/// [`HIDDEN_COLUMN`] exactly when `visible` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelViewState {
    pub active: bool,
    pub visible: bool,
    pub position: i32,
}

impl Default for PanelViewState {
    fn default() -> Self {
        Self {
            active: false,
            visible: false,
            position: HIDDEN_COLUMN,
        }
    }
}

/// One editor group as seen by the layout source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleGroup {
    /// The resource currently shown in the group, if any.
    pub resource: Option<ResourceUri>,
    /// 1-based column index.
    pub column: i32,
}

/// Editor layout at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LayoutSnapshot {
    pub focused: Option<ResourceUri>,
    pub groups: Vec<VisibleGroup>,
}

impl LayoutSnapshot {
    /// Column of the first group showing `resource`. Groups reporting a
    /// column below 1 are skipped.
    pub fn column_of(&self, resource: &ResourceUri) -> Option<i32> {
        self.groups
            .iter()
            .filter(|g| g.column >= 1)
            .find(|g| g.resource.as_ref() == Some(resource))
            .map(|g| g.column)
    }

    pub fn is_focused(&self, resource: &ResourceUri) -> bool {
        self.focused.as_ref() == Some(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_options_merge_prefers_override() {
        let stored = ShowOptions {
            view_column: Some(1),
            preserve_focus: Some(true),
        };
        let merged = stored.merged(&ShowOptions::in_column(3));
        assert_eq!(merged.view_column, Some(3));
        assert_eq!(merged.preserve_focus, Some(true));

        let merged = stored.merged(&ShowOptions::default());
        assert_eq!(merged, stored);
    }

    #[test]
    fn open_options_from_view_column() {
        let opts = OpenOptions::from_show_options(&ShowOptions::default());
        assert_eq!(opts.target, OpenTarget::Active);
        assert!(opts.focus);

        let opts = OpenOptions::from_show_options(&ShowOptions::in_column(VIEW_COLUMN_BESIDE));
        assert_eq!(opts.target, OpenTarget::Beside);

        let opts = OpenOptions::from_show_options(&ShowOptions::in_column(2));
        assert_eq!(opts.target, OpenTarget::Group(1));

        let opts = OpenOptions::from_show_options(&ShowOptions {
            view_column: Some(1),
            preserve_focus: Some(true),
        });
        assert_eq!(opts.target, OpenTarget::Group(0));
        assert!(!opts.focus);
    }

    #[test]
    fn default_view_state_is_hidden() {
        let state = PanelViewState::default();
        assert!(!state.active);
        assert!(!state.visible);
        assert_eq!(state.position, HIDDEN_COLUMN);
    }

    #[test]
    fn layout_first_match_wins() {
        let r = ResourceUri::from("webview-panel://a");
        let layout = LayoutSnapshot {
            focused: Some(r.clone()),
            groups: vec![
                VisibleGroup {
                    resource: None,
                    column: 1,
                },
                VisibleGroup {
                    resource: Some(r.clone()),
                    column: 2,
                },
                VisibleGroup {
                    resource: Some(r.clone()),
                    column: 3,
                },
            ],
        };
        assert_eq!(layout.column_of(&r), Some(2));
        assert!(layout.is_focused(&r));
        assert_eq!(layout.column_of(&ResourceUri::from("other")), None);
    }

    #[test]
    fn webview_options_use_camel_case() {
        let opts = WebviewOptions {
            enable_scripts: true,
            retain_context_when_hidden: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["enableScripts"], true);
        assert_eq!(json["retainContextWhenHidden"], true);
        assert!(json.get("localResourceRoots").is_none());

        let back: WebviewOptions = serde_json::from_str(r#"{"enableScripts":true}"#).unwrap();
        assert!(back.enable_scripts);
        assert!(!back.enable_command_uris);
    }
}
