use serde_json::Value;
use tracing::{debug, info, warn};
use vista_common::{PanelId, WebviewError};

use crate::host::ComponentOptions;
use crate::types::{
    ExtensionInfo, IconPath, OpenOptions, PanelViewState, ShowOptions, WebviewOptions,
    HIDDEN_COLUMN,
};

use super::panel::{Panel, PanelResources};
use super::WebviewPanelCoordinator;

/// Arguments of [`WebviewPanelCoordinator::create_panel`].
#[derive(Debug, Clone)]
pub struct CreatePanelRequest {
    pub id: PanelId,
    pub view_type: String,
    pub title: String,
    pub show_options: ShowOptions,
    pub options: WebviewOptions,
    pub extension: ExtensionInfo,
    pub initial_state: Option<Value>,
}

impl CreatePanelRequest {
    /// A request with default show and webview options.
    pub fn new(id: impl Into<PanelId>, view_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            view_type: view_type.into(),
            title: title.into(),
            show_options: ShowOptions::default(),
            options: WebviewOptions::default(),
            extension: ExtensionInfo::default(),
            initial_state: None,
        }
    }

    pub fn show_options(mut self, show_options: ShowOptions) -> Self {
        self.show_options = show_options;
        self
    }

    pub fn options(mut self, options: WebviewOptions) -> Self {
        self.options = options;
        self
    }

    pub fn extension(mut self, extension: ExtensionInfo) -> Self {
        self.extension = extension;
        self
    }

    pub fn initial_state(mut self, state: Option<Value>) -> Self {
        self.initial_state = state;
        self
    }
}

impl WebviewPanelCoordinator {
    /// Register and open a new panel, then persist its metadata.
    ///
    /// A duplicate id is rejected before anything is created.
    pub async fn create_panel(&mut self, request: CreatePanelRequest) -> Result<(), WebviewError> {
        if self.index.contains_key(&request.id) {
            return Err(WebviewError::PanelAlreadyExists(request.id.to_string()));
        }

        let handle = self
            .deps
            .host
            .create_component(&request.id, ComponentOptions::from(&request.options))?;
        let mut resources = PanelResources::new(handle);
        let component = resources.component.as_mut();

        component.set_title(&request.title);
        component.set_supports_revive(self.revivers.contains(&request.view_type));
        component.open(OpenOptions::from_show_options(&request.show_options));
        if let Some(state) = request.initial_state {
            component.set_state(state);
        }
        let resource = component.resource_uri();

        let view_column = request
            .show_options
            .view_column
            .filter(|c| *c >= 1)
            .unwrap_or(HIDDEN_COLUMN);

        let id = request.id;
        let key = self.panels.insert(Panel {
            id: id.clone(),
            view_type: request.view_type,
            extension: request.extension,
            title: request.title,
            resource,
            view_column,
            show_options: request.show_options,
            options: request.options,
            resources,
        });
        self.view_states.insert(key, PanelViewState::default());
        self.index.insert(id.clone(), key);

        if let Err(e) = self.persist_panel_meta(key).await {
            warn!(panel_id = %id, error = %e, "panel record write failed, releasing panel");
            if let Some(panel) = self.detach(key) {
                panel.resources.release();
            }
            return Err(e);
        }
        info!(panel_id = %id, view_type = %self.panels[key].view_type, "webview panel created");
        Ok(())
    }

    /// Delete everything persisted for a panel, then release it.
    ///
    /// If a delete fails the panel stays registered, so the call can be
    /// retried.
    pub async fn dispose_panel(&mut self, id: &PanelId) -> Result<(), WebviewError> {
        let key = self.key_of(id)?;
        let view_type = self.panels[key].view_type.clone();

        // Pending content state must be cancelled before the record goes,
        // otherwise a trailing write could outlive the delete.
        self.content_state.cancel(&view_type, id).await?;
        self.panel_store.delete(id.as_str()).await?;

        if let Some(panel) = self.detach(key) {
            panel.resources.release();
        }
        info!(panel_id = %id, view_type = %view_type, "webview panel disposed");
        Ok(())
    }

    /// Re-open a panel, with `show_options` overriding its stored ones.
    pub fn reveal_panel(
        &mut self,
        id: &PanelId,
        show_options: Option<ShowOptions>,
    ) -> Result<(), WebviewError> {
        let key = self.key_of(id)?;
        let panel = &mut self.panels[key];
        let merged = panel
            .show_options
            .merged(&show_options.unwrap_or_default());
        let component = panel.resources.component.as_mut();
        component.open(OpenOptions::from_show_options(&merged));
        panel.resource = component.resource_uri();
        debug!(panel_id = %id, view_column = ?merged.view_column, "webview panel revealed");
        Ok(())
    }

    pub async fn set_title(&mut self, id: &PanelId, title: &str) -> Result<(), WebviewError> {
        let key = self.key_of(id)?;
        let panel = &mut self.panels[key];
        panel.title = title.to_string();
        panel.resources.component.set_title(title);
        self.persist_panel_meta(key).await
    }

    pub fn set_html(&mut self, id: &PanelId, html: &str) -> Result<(), WebviewError> {
        let key = self.key_of(id)?;
        self.panels[key].resources.component.set_html(html);
        Ok(())
    }

    /// Replace the webview options. Retaining context while hidden is a
    /// panel option fixed at creation and is kept.
    pub fn set_options(&mut self, id: &PanelId, options: WebviewOptions) -> Result<(), WebviewError> {
        let key = self.key_of(id)?;
        let panel = &mut self.panels[key];
        panel.options = WebviewOptions {
            retain_context_when_hidden: panel.options.retain_context_when_hidden,
            ..options
        };
        panel
            .resources
            .component
            .update_options(ComponentOptions::from(&panel.options));
        Ok(())
    }

    pub fn set_icon(&mut self, id: &PanelId, icon: Option<IconPath>) -> Result<(), WebviewError> {
        let key = self.key_of(id)?;
        self.panels[key].resources.component.set_icon(icon.as_ref());
        Ok(())
    }

    /// Deliver `payload` to the panel's content. Delivery is best-effort:
    /// an unknown panel or a detached channel yields `false`.
    pub async fn post_message(&self, id: &PanelId, payload: Value) -> bool {
        let Some(panel) = self.panel(id) else {
            debug!(panel_id = %id, "post_message to unknown panel");
            return false;
        };
        match panel.resources.component.post_message(payload).await {
            Ok(()) => true,
            Err(e) => {
                warn!(panel_id = %id, error = %e, "post_message failed");
                false
            }
        }
    }
}
