use serde_json::Value;
use tracing::{debug, info, warn};
use vista_common::{PanelId, WebviewError};

use super::panel::PlainWebview;
use super::WebviewPanelCoordinator;

impl WebviewPanelCoordinator {
    /// Create a plain webview in the editor and subscribe to it.
    pub fn create_plain_webview(
        &mut self,
        id: &PanelId,
        title: &str,
        icon: Option<&str>,
    ) -> Result<(), WebviewError> {
        if self.plain.contains_key(id) {
            return Err(WebviewError::PanelAlreadyExists(id.to_string()));
        }
        let handle = self.deps.host.create_plain_component(id, title, icon)?;
        self.plain
            .insert(id.clone(), PlainWebview::new(Some(title.to_string()), handle));
        info!(webview_id = %id, "plain webview created");
        Ok(())
    }

    /// Subscribe to a plain webview the editor already knows about,
    /// creating it if needed. Connecting twice is a no-op.
    pub fn connect_plain_webview(&mut self, id: &PanelId) -> Result<(), WebviewError> {
        if self.plain.contains_key(id) {
            return Ok(());
        }
        let handle = self.deps.host.open_plain_component(id)?;
        self.plain.insert(id.clone(), PlainWebview::new(None, handle));
        debug!(webview_id = %id, "plain webview connected");
        Ok(())
    }

    pub fn has_plain_webview(&self, id: &PanelId) -> bool {
        self.plain.contains_key(id)
    }

    pub fn plain_webview_title(&self, id: &PanelId) -> Option<&str> {
        self.plain.get(id).and_then(|p| p.title.as_deref())
    }

    /// Best-effort delivery to a plain webview.
    pub async fn post_message_to_plain_webview(&self, id: &PanelId, payload: Value) -> bool {
        let Some(plain) = self.plain.get(id) else {
            return false;
        };
        match plain.component.post_message(payload).await {
            Ok(()) => true,
            Err(e) => {
                warn!(webview_id = %id, error = %e, "post to plain webview failed");
                false
            }
        }
    }

    pub async fn plain_webview_load_url(&self, id: &PanelId, url: &str) -> Result<(), WebviewError> {
        let plain = self
            .plain
            .get(id)
            .ok_or_else(|| WebviewError::PlainWebviewNotFound(id.to_string()))?;
        plain.component.load_url(url).await
    }

    pub async fn reveal_plain_webview(
        &self,
        id: &PanelId,
        group_index: usize,
    ) -> Result<(), WebviewError> {
        let plain = self
            .plain
            .get(id)
            .ok_or_else(|| WebviewError::PlainWebviewNotFound(id.to_string()))?;
        plain.component.open(group_index).await
    }

    /// Release a plain webview. Unknown ids are ignored.
    pub fn dispose_plain_webview(&mut self, id: &PanelId) {
        if let Some(plain) = self.plain.remove(id) {
            plain.release();
            debug!(webview_id = %id, "plain webview disposed");
        }
    }
}
