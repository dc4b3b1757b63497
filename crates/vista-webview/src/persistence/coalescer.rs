//! Trailing-edge coalescing of content-state writes.
//!
//! Each view type owns a lane: the first update opens a window of
//! `interval`, later updates in the window overwrite the pending value for
//! their panel, and when the window closes the latest value per panel is
//! written. Lanes are independent; there is no ordering across view types.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use vista_common::{PanelId, StoreError};

use crate::storage::{ScopedStore, StorageProvider};

#[derive(Default)]
struct Window {
    values: BTreeMap<PanelId, Value>,
    timer: Option<JoinHandle<()>>,
}

struct Lane {
    view_type: String,
    store: Arc<dyn ScopedStore>,
    window: Mutex<Window>,
    /// Held across every store write and delete of this lane, so a cancel
    /// always lands after a flush that already took its values.
    write_lock: tokio::sync::Mutex<()>,
}

impl Lane {
    async fn flush(&self) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;
        let values = std::mem::take(&mut self.window.lock().unwrap().values);
        let count = values.len();
        let mut first_error = None;
        for (id, value) in values {
            if let Err(e) = self.store.set(id.as_str(), value).await {
                warn!(view_type = %self.view_type, panel_id = %id, error = %e, "content state write failed");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(count),
        }
    }
}

/// Per-view-type coalescer for webview content state.
pub struct StateCoalescer {
    storage: Arc<dyn StorageProvider>,
    namespace_prefix: String,
    interval: Duration,
    lanes: HashMap<String, Arc<Lane>>,
}

impl StateCoalescer {
    pub fn new(
        storage: Arc<dyn StorageProvider>,
        namespace_prefix: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            storage,
            namespace_prefix: namespace_prefix.into(),
            interval,
            lanes: HashMap::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    async fn lane(&mut self, view_type: &str) -> Result<Arc<Lane>, StoreError> {
        if let Some(lane) = self.lanes.get(view_type) {
            return Ok(Arc::clone(lane));
        }
        let namespace = vista_config::state_namespace(&self.namespace_prefix, view_type);
        let store = self.storage.open(&namespace).await?;
        let lane = Arc::new(Lane {
            view_type: view_type.to_string(),
            store,
            window: Mutex::new(Window::default()),
            write_lock: tokio::sync::Mutex::new(()),
        });
        self.lanes.insert(view_type.to_string(), Arc::clone(&lane));
        Ok(lane)
    }

    /// Record the latest state for a panel, opening a window if none is open.
    pub async fn push(
        &mut self,
        view_type: &str,
        id: &PanelId,
        state: Value,
    ) -> Result<(), StoreError> {
        let lane = self.lane(view_type).await?;
        let mut window = lane.window.lock().unwrap();
        window.values.insert(id.clone(), state);
        if window.timer.is_none() {
            let interval = self.interval;
            let task_lane = Arc::clone(&lane);
            window.timer = Some(tokio::spawn(async move {
                tokio::time::sleep(interval).await;
                // Detach before the first await so an external flush never
                // aborts a write in progress.
                task_lane.window.lock().unwrap().timer = None;
                match task_lane.flush().await {
                    Ok(count) => {
                        debug!(view_type = %task_lane.view_type, count, "content state flushed")
                    }
                    Err(e) => {
                        warn!(view_type = %task_lane.view_type, error = %e, "content state flush failed")
                    }
                }
            }));
        }
        Ok(())
    }

    /// Drop any pending state for `id` and delete its stored blob.
    ///
    /// Waits for an in-flight flush of the lane, so no write for `id` can
    /// land after this returns.
    pub async fn cancel(&mut self, view_type: &str, id: &PanelId) -> Result<(), StoreError> {
        let lane = self.lane(view_type).await?;
        let _guard = lane.write_lock.lock().await;
        lane.window.lock().unwrap().values.remove(id);
        lane.store.delete(id.as_str()).await
    }

    /// Latest known state for a panel: a pending value, else the stored one.
    pub async fn load(&mut self, view_type: &str, id: &PanelId) -> Result<Option<Value>, StoreError> {
        let lane = self.lane(view_type).await?;
        let pending = lane.window.lock().unwrap().values.get(id).cloned();
        match pending {
            Some(value) => Ok(Some(value)),
            None => lane.store.get(id.as_str()).await,
        }
    }

    /// Whether a write is waiting for its window to close.
    pub fn has_pending(&self, view_type: &str, id: &PanelId) -> bool {
        self.lanes
            .get(view_type)
            .map(|lane| lane.window.lock().unwrap().values.contains_key(id))
            .unwrap_or(false)
    }

    /// Write every pending value now, cancelling open windows.
    pub async fn flush_all(&mut self) -> Result<usize, StoreError> {
        let mut total = 0;
        for lane in self.lanes.values() {
            if let Some(timer) = lane.window.lock().unwrap().timer.take() {
                timer.abort();
            }
            total += lane.flush().await?;
        }
        Ok(total)
    }
}
