//! Seams to the collaborators the coordinator drives but does not own:
//! the editor-side webview factory, the extension host, activation,
//! link opening, and command authorization.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use vista_common::{PanelId, WebviewError};

use crate::events::ChannelEvent;
use crate::types::{ExtensionInfo, IconPath, OpenOptions, PanelViewState, ResourceUri, WebviewOptions};

/// A message could not reach the webview content.
#[derive(Debug, Clone, thiserror::Error)]
#[error("message delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Options a webview component is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComponentOptions {
    pub allow_scripts: bool,
    /// Keep the content alive while its tab is hidden.
    pub long_live: bool,
}

impl From<&WebviewOptions> for ComponentOptions {
    fn from(options: &WebviewOptions) -> Self {
        Self {
            allow_scripts: options.enable_scripts,
            long_live: options.retain_context_when_hidden,
        }
    }
}

/// An editor tab hosting webview content for one panel.
#[async_trait]
pub trait WebviewComponent: Send + Sync {
    fn resource_uri(&self) -> ResourceUri;
    fn set_title(&mut self, title: &str);
    fn set_icon(&mut self, icon: Option<&IconPath>);
    fn set_html(&mut self, html: &str);
    fn update_options(&mut self, options: ComponentOptions);
    fn set_state(&mut self, state: Value);
    fn set_supports_revive(&mut self, supports: bool);
    fn open(&mut self, options: OpenOptions);
    async fn post_message(&self, payload: Value) -> Result<(), DeliveryError>;
    fn dispose(&mut self);
}

/// A URL-backed webview without panel semantics.
#[async_trait]
pub trait PlainWebviewComponent: Send + Sync {
    async fn post_message(&self, payload: Value) -> Result<(), DeliveryError>;
    async fn load_url(&self, url: &str) -> Result<(), WebviewError>;
    /// Open in the editor group at `group_index`. Components that are not
    /// editor tabs return an error.
    async fn open(&self, group_index: usize) -> Result<(), WebviewError>;
    fn dispose(&mut self);
}

/// A created component together with its channel subscription.
pub struct ComponentHandle<C: ?Sized> {
    pub component: Box<C>,
    pub events: UnboundedReceiver<ChannelEvent>,
}

/// Factory for editor-side webview components.
pub trait WebviewHost: Send + Sync {
    fn create_component(
        &self,
        id: &PanelId,
        options: ComponentOptions,
    ) -> Result<ComponentHandle<dyn WebviewComponent>, WebviewError>;

    fn create_plain_component(
        &self,
        id: &PanelId,
        title: &str,
        icon: Option<&str>,
    ) -> Result<ComponentHandle<dyn PlainWebviewComponent>, WebviewError>;

    /// Look up a plain component already known to the editor, or create one.
    fn open_plain_component(
        &self,
        id: &PanelId,
    ) -> Result<ComponentHandle<dyn PlainWebviewComponent>, WebviewError>;
}

/// Arguments the extension host needs to rebuild a revived panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeserializeRequest {
    pub id: PanelId,
    pub view_type: String,
    pub title: String,
    pub state: Option<Value>,
    pub view_column: i32,
    pub options: WebviewOptions,
}

/// The extension host's side of the webview protocol.
///
/// Notifications are fire-and-forget; only `init` and
/// `deserialize_panel` are awaited.
#[async_trait]
pub trait ExtHostProxy: Send + Sync {
    async fn init(&self) -> Result<(), WebviewError>;
    fn on_view_state_changed(&self, id: &PanelId, state: PanelViewState);
    fn on_message(&self, id: &PanelId, payload: Value);
    fn on_did_dispose_panel(&self, id: &PanelId);
    async fn deserialize_panel(&self, request: DeserializeRequest) -> Result<(), WebviewError>;
    fn accept_plain_message(&self, id: &PanelId, payload: Value);
}

/// Activates extensions that contribute to an activation event.
#[async_trait]
pub trait ActivationService: Send + Sync {
    async fn fire_event(&self, topic: &str, data: &str) -> Result<(), WebviewError>;
}

/// Opens links that passed authorization.
pub trait LinkOpener: Send + Sync {
    fn open(&self, link: &str);
}

/// Decides whether an extension may run a command from webview content.
pub trait CommandPolicy: Send + Sync {
    fn is_permitted(&self, command: &str, extension: &ExtensionInfo, args: &[Value]) -> bool;
}
