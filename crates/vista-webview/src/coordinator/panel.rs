use tokio::sync::mpsc::UnboundedReceiver;
use vista_common::PanelId;

use crate::events::ChannelEvent;
use crate::host::{ComponentHandle, PlainWebviewComponent, WebviewComponent};
use crate::persistence::PersistedPanelRecord;
use crate::types::{ExtensionInfo, ResourceUri, ShowOptions, WebviewOptions};

slotmap::new_key_type! { pub(crate) struct PanelKey; }

/// Everything a panel acquired at creation, released as one unit.
pub(crate) struct PanelResources {
    pub(crate) component: Box<dyn WebviewComponent>,
    pub(crate) events: UnboundedReceiver<ChannelEvent>,
}

impl PanelResources {
    pub(crate) fn new(handle: ComponentHandle<dyn WebviewComponent>) -> Self {
        Self {
            component: handle.component,
            events: handle.events,
        }
    }

    /// Close the subscription first so no event queued after this point is
    /// ever observed, then dispose the component.
    pub(crate) fn release(mut self) {
        self.events.close();
        self.component.dispose();
    }
}

/// A live panel in the arena.
pub(crate) struct Panel {
    pub(crate) id: PanelId,
    pub(crate) view_type: String,
    pub(crate) extension: ExtensionInfo,
    pub(crate) title: String,
    pub(crate) resource: ResourceUri,
    pub(crate) view_column: i32,
    pub(crate) show_options: ShowOptions,
    pub(crate) options: WebviewOptions,
    pub(crate) resources: PanelResources,
}

impl Panel {
    pub(crate) fn to_record(&self) -> PersistedPanelRecord {
        PersistedPanelRecord {
            id: self.id.clone(),
            view_type: self.view_type.clone(),
            view_column: self.view_column,
            extension_info: self.extension.clone(),
            webview_options: self.options.clone(),
            title: self.title.clone(),
        }
    }
}

/// A plain webview and its subscription.
pub(crate) struct PlainWebview {
    pub(crate) title: Option<String>,
    pub(crate) component: Box<dyn PlainWebviewComponent>,
    pub(crate) events: UnboundedReceiver<ChannelEvent>,
}

impl PlainWebview {
    pub(crate) fn new(
        title: Option<String>,
        handle: ComponentHandle<dyn PlainWebviewComponent>,
    ) -> Self {
        Self {
            title,
            component: handle.component,
            events: handle.events,
        }
    }

    pub(crate) fn release(mut self) {
        self.events.close();
        self.component.dispose();
    }
}
