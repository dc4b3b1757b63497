//! Headless collaborators for running the coordinator without an editor.
//!
//! Components only log what they are asked to do. Extension-host
//! notifications are written as JSON lines to a [`JsonLines`] sink.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn};
use vista_common::{PanelId, WebviewError};
use vista_webview::{
    ActivationService, ChannelEvent, CommandPolicy, ComponentHandle, ComponentOptions,
    DeliveryError, DeserializeRequest, ExtHostProxy, ExtensionInfo, IconPath, LinkOpener,
    OpenOptions, PanelViewState, PlainWebviewComponent, ResourceUri, WebviewComponent,
    WebviewHost,
};

/// Writes one JSON document per line.
pub struct JsonLines {
    out: Mutex<Box<dyn Write + Send>>,
}

impl JsonLines {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn emit<T: Serialize>(&self, value: &T) {
        let line = match serde_json::to_string(value) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "failed to serialize output line");
                return;
            }
        };
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            warn!(error = %e, "failed to write output line");
        }
    }
}

/// A notification sent to the extension host.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Notification<'a> {
    Init,
    ViewStateChanged {
        id: &'a PanelId,
        state: PanelViewState,
    },
    Message {
        id: &'a PanelId,
        payload: Value,
    },
    DidDisposePanel {
        id: &'a PanelId,
    },
    DeserializePanel(&'a DeserializeRequest),
    PlainMessage {
        id: &'a PanelId,
        payload: Value,
    },
}

/// Extension-host proxy that prints every notification.
pub struct JsonLinesProxy {
    sink: Arc<JsonLines>,
}

impl JsonLinesProxy {
    pub fn new(sink: Arc<JsonLines>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl ExtHostProxy for JsonLinesProxy {
    async fn init(&self) -> Result<(), WebviewError> {
        self.sink.emit(&Notification::Init);
        Ok(())
    }

    fn on_view_state_changed(&self, id: &PanelId, state: PanelViewState) {
        self.sink.emit(&Notification::ViewStateChanged { id, state });
    }

    fn on_message(&self, id: &PanelId, payload: Value) {
        self.sink.emit(&Notification::Message { id, payload });
    }

    fn on_did_dispose_panel(&self, id: &PanelId) {
        self.sink.emit(&Notification::DidDisposePanel { id });
    }

    async fn deserialize_panel(&self, request: DeserializeRequest) -> Result<(), WebviewError> {
        self.sink.emit(&Notification::DeserializePanel(&request));
        Ok(())
    }

    fn accept_plain_message(&self, id: &PanelId, payload: Value) {
        self.sink.emit(&Notification::PlainMessage { id, payload });
    }
}

struct HeadlessComponent {
    id: PanelId,
    resource: ResourceUri,
    disposed: bool,
}

#[async_trait]
impl WebviewComponent for HeadlessComponent {
    fn resource_uri(&self) -> ResourceUri {
        self.resource.clone()
    }

    fn set_title(&mut self, title: &str) {
        debug!(panel_id = %self.id, title, "set title");
    }

    fn set_icon(&mut self, icon: Option<&IconPath>) {
        debug!(panel_id = %self.id, has_icon = icon.is_some(), "set icon");
    }

    fn set_html(&mut self, html: &str) {
        debug!(panel_id = %self.id, bytes = html.len(), "set html");
    }

    fn update_options(&mut self, options: ComponentOptions) {
        debug!(panel_id = %self.id, ?options, "update options");
    }

    fn set_state(&mut self, _state: Value) {
        debug!(panel_id = %self.id, "restore content state");
    }

    fn set_supports_revive(&mut self, supports: bool) {
        debug!(panel_id = %self.id, supports, "set supports revive");
    }

    fn open(&mut self, options: OpenOptions) {
        debug!(panel_id = %self.id, target = ?options.target, focus = options.focus, "open");
    }

    async fn post_message(&self, _payload: Value) -> Result<(), DeliveryError> {
        if self.disposed {
            return Err(DeliveryError(format!("panel {} is disposed", self.id)));
        }
        Ok(())
    }

    fn dispose(&mut self) {
        self.disposed = true;
        debug!(panel_id = %self.id, "component disposed");
    }
}

struct HeadlessPlainComponent {
    id: PanelId,
}

#[async_trait]
impl PlainWebviewComponent for HeadlessPlainComponent {
    async fn post_message(&self, _payload: Value) -> Result<(), DeliveryError> {
        Ok(())
    }

    async fn load_url(&self, url: &str) -> Result<(), WebviewError> {
        debug!(webview_id = %self.id, url, "load url");
        Ok(())
    }

    async fn open(&self, group_index: usize) -> Result<(), WebviewError> {
        debug!(webview_id = %self.id, group_index, "open plain webview");
        Ok(())
    }

    fn dispose(&mut self) {
        debug!(webview_id = %self.id, "plain component disposed");
    }
}

/// Component factory that keeps each component's channel sender so
/// editor-side events can be injected.
#[derive(Default)]
pub struct HeadlessHost {
    senders: Mutex<HashMap<PanelId, UnboundedSender<ChannelEvent>>>,
}

impl HeadlessHost {
    /// The resource a panel's tab is shown under.
    pub fn resource_for(id: &PanelId) -> ResourceUri {
        ResourceUri::new(format!("webview-panel://{id}"))
    }

    /// Deliver an editor-side event to a component. Returns false when the
    /// component is unknown or its subscription was released.
    pub fn inject(&self, id: &PanelId, event: ChannelEvent) -> bool {
        let Ok(senders) = self.senders.lock() else {
            return false;
        };
        senders
            .get(id)
            .is_some_and(|tx| tx.send(event).is_ok())
    }

    fn subscribe(&self, id: &PanelId) -> mpsc::UnboundedReceiver<ChannelEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut senders) = self.senders.lock() {
            senders.insert(id.clone(), tx);
        }
        rx
    }
}

impl WebviewHost for HeadlessHost {
    fn create_component(
        &self,
        id: &PanelId,
        options: ComponentOptions,
    ) -> Result<ComponentHandle<dyn WebviewComponent>, WebviewError> {
        debug!(panel_id = %id, ?options, "creating headless component");
        Ok(ComponentHandle {
            component: Box::new(HeadlessComponent {
                id: id.clone(),
                resource: Self::resource_for(id),
                disposed: false,
            }),
            events: self.subscribe(id),
        })
    }

    fn create_plain_component(
        &self,
        id: &PanelId,
        title: &str,
        _icon: Option<&str>,
    ) -> Result<ComponentHandle<dyn PlainWebviewComponent>, WebviewError> {
        debug!(webview_id = %id, title, "creating headless plain component");
        Ok(ComponentHandle {
            component: Box::new(HeadlessPlainComponent { id: id.clone() }),
            events: self.subscribe(id),
        })
    }

    fn open_plain_component(
        &self,
        id: &PanelId,
    ) -> Result<ComponentHandle<dyn PlainWebviewComponent>, WebviewError> {
        self.create_plain_component(id, "", None)
    }
}

/// Activation service with no extensions to activate.
pub struct LoggingActivation;

#[async_trait]
impl ActivationService for LoggingActivation {
    async fn fire_event(&self, topic: &str, data: &str) -> Result<(), WebviewError> {
        info!(topic, data, "activation event");
        Ok(())
    }
}

/// Link opener that records the link in the log.
pub struct LoggingOpener;

impl LinkOpener for LoggingOpener {
    fn open(&self, link: &str) {
        info!(link, "open link");
    }
}

/// Permits only the listed commands.
#[derive(Default)]
pub struct CommandAllowList(pub Vec<String>);

impl CommandPolicy for CommandAllowList {
    fn is_permitted(&self, command: &str, extension: &ExtensionInfo, _args: &[Value]) -> bool {
        let permitted = self.0.iter().any(|c| c == command);
        debug!(command, extension = %extension.id, permitted, "command link check");
        permitted
    }
}
