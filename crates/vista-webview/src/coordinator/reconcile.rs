use tracing::{debug, warn};
use vista_common::WebviewError;

use crate::types::{LayoutSnapshot, PanelViewState, ResourceUri, HIDDEN_COLUMN};

use super::panel::PanelKey;
use super::WebviewPanelCoordinator;

/// Project a panel's resource onto a layout snapshot.
pub(crate) fn project(resource: &ResourceUri, layout: &LayoutSnapshot) -> PanelViewState {
    let active = layout.is_focused(resource);
    match layout.column_of(resource) {
        Some(column) => PanelViewState {
            active,
            visible: true,
            position: column,
        },
        None => PanelViewState {
            active,
            visible: false,
            position: HIDDEN_COLUMN,
        },
    }
}

impl WebviewPanelCoordinator {
    /// Recompute every live panel's view-state against `layout`.
    ///
    /// All panels are projected and notified before any metadata write is
    /// awaited, so one call reflects exactly one snapshot. Returns the number
    /// of panels whose state changed.
    pub async fn reconcile_layout(&mut self, layout: &LayoutSnapshot) -> Result<usize, WebviewError> {
        let mut changed = 0;
        let mut moved: Vec<PanelKey> = Vec::new();

        for (key, panel) in self.panels.iter_mut() {
            let next = project(&panel.resource, layout);
            let Some(current) = self.view_states.get_mut(key) else {
                continue;
            };
            if *current == next {
                continue;
            }
            *current = next;
            changed += 1;
            self.deps.proxy.on_view_state_changed(&panel.id, next);
            debug!(
                panel_id = %panel.id,
                active = next.active,
                visible = next.visible,
                position = next.position,
                "panel view state changed"
            );

            if next.position != panel.view_column {
                panel.view_column = next.position;
                moved.push(key);
            }
        }

        let mut first_error = None;
        for key in moved {
            if let Err(e) = self.persist_panel_meta(key).await {
                warn!(error = %e, "failed to persist panel column");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(changed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VisibleGroup;

    fn group(resource: Option<&str>, column: i32) -> VisibleGroup {
        VisibleGroup {
            resource: resource.map(ResourceUri::from),
            column,
        }
    }

    #[test]
    fn focused_and_shown() {
        let r = ResourceUri::from("webview-panel://a");
        let layout = LayoutSnapshot {
            focused: Some(r.clone()),
            groups: vec![group(Some("x"), 1), group(Some("webview-panel://a"), 2)],
        };
        assert_eq!(
            project(&r, &layout),
            PanelViewState {
                active: true,
                visible: true,
                position: 2
            }
        );
    }

    #[test]
    fn not_shown_is_hidden() {
        let r = ResourceUri::from("webview-panel://a");
        let layout = LayoutSnapshot {
            focused: None,
            groups: vec![group(None, 1), group(Some("x"), 2)],
        };
        assert_eq!(project(&r, &layout), PanelViewState::default());
    }

    #[test]
    fn invalid_column_never_makes_visible() {
        let r = ResourceUri::from("webview-panel://a");
        let layout = LayoutSnapshot {
            focused: None,
            groups: vec![group(Some("webview-panel://a"), 0)],
        };
        let state = project(&r, &layout);
        assert!(!state.visible);
        assert_eq!(state.position, HIDDEN_COLUMN);
    }
}
