//! Main-thread side of the extension webview bridge.
//!
//! Provides:
//! - A panel registry with layout-driven view-state reconciliation
//! - Persistence of panel metadata and coalesced content state
//! - Revival of persisted panels after a restart
//! - Authorization of links clicked inside webview content
//! - Plain (URL-backed) webviews

pub mod coordinator;
pub mod events;
pub mod host;
pub mod links;
pub mod persistence;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{
    CoordinatorDeps, CoordinatorSettings, CreatePanelRequest, WebviewPanelCoordinator,
};
pub use events::ChannelEvent;
pub use host::{
    ActivationService, CommandPolicy, ComponentHandle, ComponentOptions, DeliveryError,
    DeserializeRequest, ExtHostProxy, LinkOpener, PlainWebviewComponent, WebviewComponent,
    WebviewHost,
};
pub use links::LinkDecision;
pub use persistence::{PersistedPanelRecord, StateCoalescer};
pub use storage::{JsonFileStorage, MemoryStorage, ScopedStore, StorageProvider};
pub use types::{
    ExtensionInfo, IconPath, LayoutSnapshot, OpenOptions, OpenTarget, PanelViewState,
    ResourceUri, ShowOptions, VisibleGroup, WebviewOptions, HIDDEN_COLUMN,
};
