//! In-process fakes for the coordinator's collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedSender};
use vista_common::{PanelId, StoreError, WebviewError};

use crate::coordinator::{CoordinatorDeps, CoordinatorSettings, WebviewPanelCoordinator};
use crate::events::ChannelEvent;
use crate::host::{
    ActivationService, CommandPolicy, ComponentHandle, ComponentOptions, DeliveryError,
    DeserializeRequest, ExtHostProxy, LinkOpener, PlainWebviewComponent, WebviewComponent,
    WebviewHost,
};
use crate::storage::{MemoryStorage, ScopedStore, StorageProvider};
use crate::types::{ExtensionInfo, IconPath, OpenOptions, PanelViewState, ResourceUri};

/// What a fake component has been told to do.
#[derive(Debug, Default, Clone)]
pub struct ComponentLog {
    pub title: String,
    pub html: String,
    pub icon: Option<IconPath>,
    pub options: Option<ComponentOptions>,
    pub state: Option<Value>,
    pub supports_revive: bool,
    pub opened: Vec<OpenOptions>,
    pub posted: Vec<Value>,
    pub loaded_urls: Vec<String>,
    pub disposed: bool,
    /// When set, posting fails as if the remote end had gone away.
    pub detached: bool,
}

type SharedLog = Arc<Mutex<ComponentLog>>;

struct FakeComponent {
    resource: ResourceUri,
    log: SharedLog,
}

#[async_trait]
impl WebviewComponent for FakeComponent {
    fn resource_uri(&self) -> ResourceUri {
        self.resource.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.log.lock().unwrap().title = title.to_string();
    }

    fn set_icon(&mut self, icon: Option<&IconPath>) {
        self.log.lock().unwrap().icon = icon.cloned();
    }

    fn set_html(&mut self, html: &str) {
        self.log.lock().unwrap().html = html.to_string();
    }

    fn update_options(&mut self, options: ComponentOptions) {
        self.log.lock().unwrap().options = Some(options);
    }

    fn set_state(&mut self, state: Value) {
        self.log.lock().unwrap().state = Some(state);
    }

    fn set_supports_revive(&mut self, supports: bool) {
        self.log.lock().unwrap().supports_revive = supports;
    }

    fn open(&mut self, options: OpenOptions) {
        self.log.lock().unwrap().opened.push(options);
    }

    async fn post_message(&self, payload: Value) -> Result<(), DeliveryError> {
        let mut log = self.log.lock().unwrap();
        if log.detached || log.disposed {
            return Err(DeliveryError("channel closed".into()));
        }
        log.posted.push(payload);
        Ok(())
    }

    fn dispose(&mut self) {
        self.log.lock().unwrap().disposed = true;
    }
}

struct FakePlainComponent {
    log: SharedLog,
    openable: bool,
}

#[async_trait]
impl PlainWebviewComponent for FakePlainComponent {
    async fn post_message(&self, payload: Value) -> Result<(), DeliveryError> {
        let mut log = self.log.lock().unwrap();
        if log.detached {
            return Err(DeliveryError("channel closed".into()));
        }
        log.posted.push(payload);
        Ok(())
    }

    async fn load_url(&self, url: &str) -> Result<(), WebviewError> {
        self.log.lock().unwrap().loaded_urls.push(url.to_string());
        Ok(())
    }

    async fn open(&self, group_index: usize) -> Result<(), WebviewError> {
        if !self.openable {
            return Err(WebviewError::Component("not able to open plain webview".into()));
        }
        self.log.lock().unwrap().opened.push(OpenOptions {
            target: crate::types::OpenTarget::Group(group_index),
            focus: true,
        });
        Ok(())
    }

    fn dispose(&mut self) {
        self.log.lock().unwrap().disposed = true;
    }
}

/// Webview factory that records every component it hands out.
#[derive(Default)]
pub struct FakeHost {
    logs: Mutex<HashMap<PanelId, SharedLog>>,
    senders: Mutex<HashMap<PanelId, UnboundedSender<ChannelEvent>>>,
    /// Ids `open_plain_component` can find without creating.
    pub known_plain: Mutex<Vec<PanelId>>,
}

impl FakeHost {
    fn register(&self, id: &PanelId) -> (SharedLog, mpsc::UnboundedReceiver<ChannelEvent>) {
        let log = SharedLog::default();
        let (tx, rx) = mpsc::unbounded_channel();
        self.logs.lock().unwrap().insert(id.clone(), Arc::clone(&log));
        self.senders.lock().unwrap().insert(id.clone(), tx);
        (log, rx)
    }

    pub fn log(&self, id: &str) -> ComponentLog {
        self.logs.lock().unwrap()[&PanelId::from(id)].lock().unwrap().clone()
    }

    pub fn set_detached(&self, id: &str) {
        self.logs.lock().unwrap()[&PanelId::from(id)].lock().unwrap().detached = true;
    }

    /// Push an event into a component's channel. Returns false once the
    /// coordinator has dropped the receiving end.
    pub fn emit(&self, id: &str, event: ChannelEvent) -> bool {
        self.senders.lock().unwrap()[&PanelId::from(id)]
            .send(event)
            .is_ok()
    }

    pub fn resource_for(id: &str) -> ResourceUri {
        ResourceUri::new(format!("webview-panel://{id}"))
    }
}

impl WebviewHost for FakeHost {
    fn create_component(
        &self,
        id: &PanelId,
        options: ComponentOptions,
    ) -> Result<ComponentHandle<dyn WebviewComponent>, WebviewError> {
        let (log, events) = self.register(id);
        log.lock().unwrap().options = Some(options);
        Ok(ComponentHandle {
            component: Box::new(FakeComponent {
                resource: Self::resource_for(id.as_str()),
                log,
            }),
            events,
        })
    }

    fn create_plain_component(
        &self,
        id: &PanelId,
        title: &str,
        _icon: Option<&str>,
    ) -> Result<ComponentHandle<dyn PlainWebviewComponent>, WebviewError> {
        let (log, events) = self.register(id);
        log.lock().unwrap().title = title.to_string();
        Ok(ComponentHandle {
            component: Box::new(FakePlainComponent {
                log,
                openable: true,
            }),
            events,
        })
    }

    fn open_plain_component(
        &self,
        id: &PanelId,
    ) -> Result<ComponentHandle<dyn PlainWebviewComponent>, WebviewError> {
        let openable = self.known_plain.lock().unwrap().contains(id);
        let (log, events) = self.register(id);
        Ok(ComponentHandle {
            component: Box::new(FakePlainComponent { log, openable }),
            events,
        })
    }
}

/// A call the coordinator made on the extension host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Init,
    ViewState(PanelId, PanelViewState),
    Message(PanelId, Value),
    Disposed(PanelId),
    Deserialize(DeserializeRequest),
    PlainMessage(PanelId, Value),
}

#[derive(Default)]
pub struct FakeProxy {
    pub calls: Mutex<Vec<HostCall>>,
    pub fail_deserialize: Mutex<bool>,
}

impl FakeProxy {
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn view_state_calls(&self) -> Vec<(PanelId, PanelViewState)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::ViewState(id, state) => Some((id, state)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ExtHostProxy for FakeProxy {
    async fn init(&self) -> Result<(), WebviewError> {
        self.record(HostCall::Init);
        Ok(())
    }

    fn on_view_state_changed(&self, id: &PanelId, state: PanelViewState) {
        self.record(HostCall::ViewState(id.clone(), state));
    }

    fn on_message(&self, id: &PanelId, payload: Value) {
        self.record(HostCall::Message(id.clone(), payload));
    }

    fn on_did_dispose_panel(&self, id: &PanelId) {
        self.record(HostCall::Disposed(id.clone()));
    }

    async fn deserialize_panel(&self, request: DeserializeRequest) -> Result<(), WebviewError> {
        self.record(HostCall::Deserialize(request));
        if *self.fail_deserialize.lock().unwrap() {
            return Err(WebviewError::Host("no serializer".into()));
        }
        Ok(())
    }

    fn accept_plain_message(&self, id: &PanelId, payload: Value) {
        self.record(HostCall::PlainMessage(id.clone(), payload));
    }
}

#[derive(Default)]
pub struct FakeActivation {
    pub fired: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ActivationService for FakeActivation {
    async fn fire_event(&self, topic: &str, data: &str) -> Result<(), WebviewError> {
        self.fired
            .lock()
            .unwrap()
            .push((topic.to_string(), data.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingOpener {
    pub opened: Mutex<Vec<String>>,
}

impl LinkOpener for RecordingOpener {
    fn open(&self, link: &str) {
        self.opened.lock().unwrap().push(link.to_string());
    }
}

/// Permits exactly the listed commands.
#[derive(Default)]
pub struct AllowList(pub Vec<String>);

impl CommandPolicy for AllowList {
    fn is_permitted(&self, command: &str, _extension: &ExtensionInfo, _args: &[Value]) -> bool {
        self.0.iter().any(|c| c == command)
    }
}

/// Switches that make every store opened through [`FaultyStorage`] fail.
#[derive(Default)]
pub struct StoreFaults {
    pub reads: AtomicBool,
    pub writes: AtomicBool,
    pub deletes: AtomicBool,
    /// Writes of this one key fail regardless of `writes`.
    pub bad_key: Mutex<Option<String>>,
}

impl StoreFaults {
    pub fn fail_reads(&self, on: bool) {
        self.reads.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.writes.store(on, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, on: bool) {
        self.deletes.store(on, Ordering::SeqCst);
    }

    pub fn fail_key(&self, key: &str) {
        *self.bad_key.lock().unwrap() = Some(key.to_string());
    }

    fn check(flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        Ok(())
    }
}

/// [`MemoryStorage`] behind fault switches.
#[derive(Clone)]
pub struct FaultyStorage {
    pub inner: MemoryStorage,
    pub faults: Arc<StoreFaults>,
}

impl FaultyStorage {
    pub fn new(inner: MemoryStorage) -> Self {
        Self {
            inner,
            faults: Arc::default(),
        }
    }
}

#[async_trait]
impl StorageProvider for FaultyStorage {
    async fn open(&self, namespace: &str) -> Result<Arc<dyn ScopedStore>, StoreError> {
        let inner = self.inner.open(namespace).await?;
        Ok(Arc::new(FaultyStore {
            inner,
            faults: Arc::clone(&self.faults),
        }))
    }
}

struct FaultyStore {
    inner: Arc<dyn ScopedStore>,
    faults: Arc<StoreFaults>,
}

#[async_trait]
impl ScopedStore for FaultyStore {
    fn namespace(&self) -> &str {
        self.inner.namespace()
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        StoreFaults::check(&self.faults.reads)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        StoreFaults::check(&self.faults.writes)?;
        let bad = self.faults.bad_key.lock().unwrap().as_deref() == Some(key);
        if bad {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        StoreFaults::check(&self.faults.deletes)?;
        self.inner.delete(key).await
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        StoreFaults::check(&self.faults.reads)?;
        self.inner.keys().await
    }
}

pub struct Harness {
    pub storage: MemoryStorage,
    pub faults: Arc<StoreFaults>,
    pub host: Arc<FakeHost>,
    pub proxy: Arc<FakeProxy>,
    pub activation: Arc<FakeActivation>,
    pub opener: Arc<RecordingOpener>,
    pub coordinator: WebviewPanelCoordinator,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_storage(MemoryStorage::new()).await
    }

    /// A fresh coordinator over existing storage, as after a restart.
    pub async fn with_storage(storage: MemoryStorage) -> Self {
        let host = Arc::new(FakeHost::default());
        let proxy = Arc::new(FakeProxy::default());
        let activation = Arc::new(FakeActivation::default());
        let opener = Arc::new(RecordingOpener::default());
        let faulty = FaultyStorage::new(storage.clone());
        let faults = Arc::clone(&faulty.faults);
        let deps = CoordinatorDeps {
            host: host.clone(),
            proxy: proxy.clone(),
            activation: activation.clone(),
            opener: opener.clone(),
            policy: Arc::new(AllowList(vec!["markdown.refresh".into()])),
            storage: Arc::new(faulty),
        };
        let coordinator = WebviewPanelCoordinator::new(deps, CoordinatorSettings::default())
            .await
            .unwrap();
        Self {
            storage,
            faults,
            host,
            proxy,
            activation,
            opener,
            coordinator,
        }
    }
}
