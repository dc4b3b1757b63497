//! Webview panel coordination.
//!
//! `WebviewPanelCoordinator` owns every live panel, keeps each panel's
//! view-state in step with the editor layout, persists panel metadata and
//! content state, and revives panels after a restart.
//!
//! Panels live in an arena keyed by [`PanelKey`]; their view-states are a
//! parallel map over the same keys, so identity and derived state are
//! created and dropped together but never mixed.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use slotmap::{SecondaryMap, SlotMap};
use tracing::{debug, info};
use vista_common::{PanelId, WebviewError};
use vista_config::VistaConfig;

use crate::host::{ActivationService, CommandPolicy, ExtHostProxy, LinkOpener, WebviewHost};
use crate::persistence::{PersistedPanelRecord, StateCoalescer};
use crate::storage::{ScopedStore, StorageProvider};
use crate::types::{PanelViewState, ResourceUri};

mod channel;
mod lifecycle;
mod panel;
mod plain;
mod reconcile;
mod revival;


pub use lifecycle::CreatePanelRequest;
pub use revival::{REVIVAL_PRIORITY_HANDLED, REVIVAL_PRIORITY_UNHANDLED};

use panel::{Panel, PanelKey, PlainWebview};

/// Collaborators the coordinator talks to.
#[derive(Clone)]
pub struct CoordinatorDeps {
    pub host: Arc<dyn WebviewHost>,
    pub proxy: Arc<dyn ExtHostProxy>,
    pub activation: Arc<dyn ActivationService>,
    pub opener: Arc<dyn LinkOpener>,
    pub policy: Arc<dyn CommandPolicy>,
    pub storage: Arc<dyn StorageProvider>,
}

/// Tunables, normally derived from [`VistaConfig`].
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub state_flush_interval: Duration,
    pub panel_namespace: String,
    pub state_namespace_prefix: String,
    pub standard_schemes: Vec<String>,
    pub resource_roots: Vec<String>,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self::from(&VistaConfig::default())
    }
}

impl From<&VistaConfig> for CoordinatorSettings {
    fn from(config: &VistaConfig) -> Self {
        Self {
            state_flush_interval: Duration::from_millis(config.persistence.state_flush_interval_ms),
            panel_namespace: config.persistence.panel_namespace.clone(),
            state_namespace_prefix: config.persistence.state_namespace_prefix.clone(),
            standard_schemes: config.links.standard_schemes.clone(),
            resource_roots: config.resources.roots.clone(),
        }
    }
}

pub struct WebviewPanelCoordinator {
    deps: CoordinatorDeps,
    settings: CoordinatorSettings,
    panel_store: Arc<dyn ScopedStore>,
    content_state: StateCoalescer,
    panels: SlotMap<PanelKey, Panel>,
    view_states: SecondaryMap<PanelKey, PanelViewState>,
    index: HashMap<PanelId, PanelKey>,
    revivers: HashSet<String>,
    plain: BTreeMap<PanelId, PlainWebview>,
}

impl WebviewPanelCoordinator {
    /// Create a coordinator, opening the panel-metadata namespace.
    pub async fn new(
        deps: CoordinatorDeps,
        settings: CoordinatorSettings,
    ) -> Result<Self, WebviewError> {
        let panel_store = deps.storage.open(&settings.panel_namespace).await?;
        let content_state = StateCoalescer::new(
            Arc::clone(&deps.storage),
            settings.state_namespace_prefix.clone(),
            settings.state_flush_interval,
        );
        Ok(Self {
            deps,
            settings,
            panel_store,
            content_state,
            panels: SlotMap::with_key(),
            view_states: SecondaryMap::new(),
            index: HashMap::new(),
            revivers: HashSet::new(),
            plain: BTreeMap::new(),
        })
    }

    /// Complete the handshake with the extension host.
    pub async fn init(&self) -> Result<(), WebviewError> {
        self.deps.proxy.init().await
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Roots from which webview content may load static resources.
    pub fn resource_roots(&self) -> &[String] {
        &self.settings.resource_roots
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn has_panel(&self, id: &PanelId) -> bool {
        self.index.contains_key(id)
    }

    /// Ids of live panels in arena order.
    pub fn panel_ids(&self) -> Vec<PanelId> {
        self.panels.values().map(|p| p.id.clone()).collect()
    }

    pub fn view_state(&self, id: &PanelId) -> Option<PanelViewState> {
        let key = self.index.get(id)?;
        self.view_states.get(*key).copied()
    }

    pub fn title(&self, id: &PanelId) -> Option<&str> {
        self.panel(id).map(|p| p.title.as_str())
    }

    pub fn view_column(&self, id: &PanelId) -> Option<i32> {
        self.panel(id).map(|p| p.view_column)
    }

    pub fn resource_uri(&self, id: &PanelId) -> Option<&ResourceUri> {
        self.panel(id).map(|p| &p.resource)
    }

    pub fn has_reviver(&self, view_type: &str) -> bool {
        self.revivers.contains(view_type)
    }

    /// The metadata record written for a live panel.
    pub fn to_persisted_record(&self, id: &PanelId) -> Result<PersistedPanelRecord, WebviewError> {
        self.panel(id)
            .map(Panel::to_record)
            .ok_or_else(|| WebviewError::PanelNotFound(id.to_string()))
    }

    /// Flush pending content state and release every panel without deleting
    /// its persisted record, so the panels can be revived on next start.
    pub async fn shutdown(&mut self) -> Result<usize, WebviewError> {
        let flushed = self.content_state.flush_all().await?;
        let count = self.panels.len();
        self.index.clear();
        self.view_states.clear();
        for (_, panel) in self.panels.drain() {
            panel.resources.release();
        }
        for (_, plain) in std::mem::take(&mut self.plain) {
            plain.release();
        }
        info!(panels = count, flushed, "webview coordinator shut down");
        Ok(flushed)
    }

    fn panel(&self, id: &PanelId) -> Option<&Panel> {
        self.index.get(id).and_then(|k| self.panels.get(*k))
    }

    fn key_of(&self, id: &PanelId) -> Result<PanelKey, WebviewError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| WebviewError::PanelNotFound(id.to_string()))
    }

    async fn persist_panel_meta(&self, key: PanelKey) -> Result<(), WebviewError> {
        let Some(panel) = self.panels.get(key) else {
            return Ok(());
        };
        let record = panel.to_record();
        self.panel_store
            .set(record.id.as_str(), record.to_value()?)
            .await?;
        debug!(panel_id = %record.id, view_column = record.view_column, "panel metadata persisted");
        Ok(())
    }

    /// Remove a panel from the arena and release its resources. Persisted
    /// data is left untouched.
    fn detach(&mut self, key: PanelKey) -> Option<Panel> {
        let panel = self.panels.remove(key)?;
        self.view_states.remove(key);
        self.index.remove(&panel.id);
        Some(panel)
    }
}
