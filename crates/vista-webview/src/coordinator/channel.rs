use tracing::{debug, warn};
use vista_common::{PanelId, WebviewError};

use crate::events::ChannelEvent;
use crate::links::{authorize_link, LinkDecision};

use super::panel::PanelKey;
use super::WebviewPanelCoordinator;

impl WebviewPanelCoordinator {
    /// Drain every live panel's and plain webview's channel and route the
    /// events.
    ///
    /// Stops at the first failing event; events still queued stay in their
    /// channels for the next call. Returns the number of events handled.
    pub async fn dispatch_channel_events(&mut self) -> Result<usize, WebviewError> {
        let mut handled = 0;

        let keys: Vec<PanelKey> = self.panels.keys().collect();
        for key in keys {
            loop {
                let Some(panel) = self.panels.get_mut(key) else {
                    break;
                };
                let Ok(event) = panel.resources.events.try_recv() else {
                    break;
                };
                handled += 1;
                self.handle_panel_event(key, event).await?;
            }
        }

        let plain_ids: Vec<PanelId> = self.plain.keys().cloned().collect();
        for id in plain_ids {
            loop {
                let Some(plain) = self.plain.get_mut(&id) else {
                    break;
                };
                let Ok(event) = plain.events.try_recv() else {
                    break;
                };
                handled += 1;
                self.handle_plain_event(&id, event);
            }
        }

        Ok(handled)
    }

    async fn handle_panel_event(
        &mut self,
        key: PanelKey,
        event: ChannelEvent,
    ) -> Result<(), WebviewError> {
        let Some(panel) = self.panels.get(key) else {
            return Ok(());
        };
        let id = panel.id.clone();

        match event {
            ChannelEvent::Message(payload) => {
                self.deps.proxy.on_message(&id, payload);
            }
            ChannelEvent::Disposed => {
                debug!(panel_id = %id, "webview disposed on the editor side");
                self.deps.proxy.on_did_dispose_panel(&id);
            }
            ChannelEvent::StateUpdated(state) => {
                if self.revivers.contains(&panel.view_type) {
                    let view_type = panel.view_type.clone();
                    self.content_state.push(&view_type, &id, state).await?;
                }
            }
            ChannelEvent::LinkClicked(uri) => {
                self.handle_link_click(&id, &uri)?;
            }
        }
        Ok(())
    }

    fn handle_plain_event(&mut self, id: &PanelId, event: ChannelEvent) {
        match event {
            ChannelEvent::Message(payload) => self.deps.proxy.accept_plain_message(id, payload),
            ChannelEvent::Disposed => {
                if let Some(plain) = self.plain.remove(id) {
                    plain.release();
                }
                debug!(webview_id = %id, "plain webview disposed");
            }
            other => debug!(webview_id = %id, event = ?other, "plain webview event ignored"),
        }
    }

    /// Authorize a link clicked in a panel and open it if allowed.
    pub fn handle_link_click(&self, id: &PanelId, uri: &str) -> Result<LinkDecision, WebviewError> {
        let panel = self
            .panel(id)
            .ok_or_else(|| WebviewError::PanelNotFound(id.to_string()))?;

        let decision = match authorize_link(
            uri,
            &self.settings.standard_schemes,
            &panel.options,
            &panel.extension,
            self.deps.policy.as_ref(),
        ) {
            Ok(decision) => decision,
            Err(e) => {
                warn!(panel_id = %id, uri, error = %e, "link blocked");
                return Err(e);
            }
        };

        match decision {
            LinkDecision::Open => self.deps.opener.open(uri),
            LinkDecision::Ignore => debug!(panel_id = %id, uri, "link ignored"),
        }
        Ok(decision)
    }
}
