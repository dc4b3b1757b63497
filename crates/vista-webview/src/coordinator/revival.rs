use tracing::{info, warn};
use vista_common::{PanelId, WebviewError};

use crate::host::DeserializeRequest;
use crate::persistence::PersistedPanelRecord;
use crate::types::ShowOptions;

use super::lifecycle::CreatePanelRequest;
use super::WebviewPanelCoordinator;

/// Priority reported for ids this coordinator can revive.
pub const REVIVAL_PRIORITY_HANDLED: i32 = 10;

/// Priority reported for ids with no persisted record.
pub const REVIVAL_PRIORITY_UNHANDLED: i32 = -1;

/// Activation event fired before a panel of a view type is revived.
const ACTIVATION_TOPIC: &str = "onWebviewPanel";

impl WebviewPanelCoordinator {
    /// Enable content-state persistence and revival for `view_type`.
    pub fn register_content_reviver(&mut self, view_type: &str) -> Result<(), WebviewError> {
        if !self.revivers.insert(view_type.to_string()) {
            return Err(WebviewError::ReviverAlreadyRegistered(view_type.to_string()));
        }
        self.set_supports_revive(view_type, true);
        info!(view_type, "content reviver registered");
        Ok(())
    }

    /// Disable content-state persistence and revival for `view_type`.
    pub fn unregister_content_reviver(&mut self, view_type: &str) -> Result<(), WebviewError> {
        if !self.revivers.remove(view_type) {
            return Err(WebviewError::ReviverNotRegistered(view_type.to_string()));
        }
        self.set_supports_revive(view_type, false);
        info!(view_type, "content reviver unregistered");
        Ok(())
    }

    fn set_supports_revive(&mut self, view_type: &str, supports: bool) {
        for panel in self.panels.values_mut().filter(|p| p.view_type == view_type) {
            panel.resources.component.set_supports_revive(supports);
        }
    }

    /// How strongly this coordinator claims revival of `id`.
    pub async fn revival_priority(&self, id: &PanelId) -> Result<i32, WebviewError> {
        Ok(match self.panel_store.get(id.as_str()).await? {
            Some(_) => REVIVAL_PRIORITY_HANDLED,
            None => REVIVAL_PRIORITY_UNHANDLED,
        })
    }

    /// Recreate a panel from its persisted record and content state, then
    /// ask the extension host to deserialize it.
    ///
    /// Without a record nothing is created. If the host fails to
    /// deserialize, the recreated panel is released again while its
    /// persisted data is kept for a later attempt.
    pub async fn revive_panel(&mut self, id: &PanelId) -> Result<(), WebviewError> {
        if self.index.contains_key(id) {
            return Err(WebviewError::PanelAlreadyExists(id.to_string()));
        }
        let Some(raw) = self.panel_store.get(id.as_str()).await? else {
            return Err(WebviewError::NoRevivalInfo(id.to_string()));
        };
        let record = PersistedPanelRecord::from_value(raw)?;

        self.deps
            .activation
            .fire_event(ACTIVATION_TOPIC, &record.view_type)
            .await?;

        let state = self.content_state.load(&record.view_type, id).await?;
        let show_options = if record.view_column >= 1 {
            ShowOptions::in_column(record.view_column)
        } else {
            ShowOptions::default()
        };

        self.create_panel(
            CreatePanelRequest::new(id.clone(), record.view_type.clone(), record.title.clone())
                .show_options(show_options)
                .options(record.webview_options.clone())
                .extension(record.extension_info.clone())
                .initial_state(state.clone()),
        )
        .await?;

        let request = DeserializeRequest {
            id: id.clone(),
            view_type: record.view_type.clone(),
            title: record.title,
            state,
            view_column: record.view_column,
            options: record.webview_options,
        };
        if let Err(e) = self.deps.proxy.deserialize_panel(request).await {
            warn!(panel_id = %id, error = %e, "extension host failed to deserialize panel");
            if let Some(key) = self.index.get(id).copied() {
                if let Some(panel) = self.detach(key) {
                    panel.resources.release();
                }
            }
            return Err(e);
        }

        info!(panel_id = %id, view_type = %record.view_type, "webview panel revived");
        Ok(())
    }
}
