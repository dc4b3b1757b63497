//! Script-driven replay of coordinator commands.
//!
//! A script is a JSON array of commands tagged by `op`. Each command runs
//! against the coordinator, queued channel events are dispatched after it,
//! and failures are reported as `error` lines without stopping the run.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use vista_common::{PanelId, VistaError, WebviewError};
use vista_webview::{
    ChannelEvent, CreatePanelRequest, ExtensionInfo, LayoutSnapshot, ShowOptions, VisibleGroup,
    WebviewOptions, WebviewPanelCoordinator,
};

use crate::headless::{HeadlessHost, JsonLines};

/// One visible editor group in a `layout` command.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupSpec {
    #[serde(default)]
    pub panel: Option<PanelId>,
    pub column: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Create {
        id: PanelId,
        view_type: String,
        title: String,
        #[serde(default)]
        show_options: ShowOptions,
        #[serde(default)]
        options: WebviewOptions,
        #[serde(default)]
        extension: Option<String>,
    },
    Dispose {
        id: PanelId,
    },
    Reveal {
        id: PanelId,
        #[serde(default)]
        show_options: Option<ShowOptions>,
    },
    SetTitle {
        id: PanelId,
        title: String,
    },
    SetHtml {
        id: PanelId,
        html: String,
    },
    PostMessage {
        id: PanelId,
        payload: Value,
    },
    Layout {
        #[serde(default)]
        focused: Option<PanelId>,
        #[serde(default)]
        groups: Vec<GroupSpec>,
    },
    RegisterReviver {
        view_type: String,
    },
    UnregisterReviver {
        view_type: String,
    },
    /// Content state reported by the panel's webview.
    StateUpdate {
        id: PanelId,
        state: Value,
    },
    Revive {
        id: PanelId,
    },
}

impl Command {
    fn op(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Dispose { .. } => "dispose",
            Self::Reveal { .. } => "reveal",
            Self::SetTitle { .. } => "set_title",
            Self::SetHtml { .. } => "set_html",
            Self::PostMessage { .. } => "post_message",
            Self::Layout { .. } => "layout",
            Self::RegisterReviver { .. } => "register_reviver",
            Self::UnregisterReviver { .. } => "unregister_reviver",
            Self::StateUpdate { .. } => "state_update",
            Self::Revive { .. } => "revive",
        }
    }
}

/// Lines the replayer itself prints, next to host notifications.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
enum Report<'a> {
    Error { op: &'a str, message: String },
    Delivered { id: &'a PanelId, delivered: bool },
    Summary { commands: usize, failed: usize, flushed: usize },
}

/// Read and parse a replay script.
pub fn load_script(path: &Path) -> Result<Vec<Command>, VistaError> {
    let text = std::fs::read_to_string(path)?;
    parse_script(&text)
}

pub fn parse_script(text: &str) -> Result<Vec<Command>, VistaError> {
    serde_json::from_str(text).map_err(|e| VistaError::Other(format!("invalid replay script: {e}")))
}

pub struct Replayer {
    coordinator: WebviewPanelCoordinator,
    host: Arc<HeadlessHost>,
    sink: Arc<JsonLines>,
}

impl Replayer {
    pub fn new(
        coordinator: WebviewPanelCoordinator,
        host: Arc<HeadlessHost>,
        sink: Arc<JsonLines>,
    ) -> Self {
        Self {
            coordinator,
            host,
            sink,
        }
    }

    /// Run every command, then flush content state and release the panels.
    /// Returns the number of failed commands.
    pub async fn run(mut self, commands: Vec<Command>) -> Result<usize, VistaError> {
        self.coordinator.init().await?;

        let total = commands.len();
        let mut failed = 0;
        for command in commands {
            let op = command.op();
            let result = match self.apply(command).await {
                Ok(()) => self.coordinator.dispatch_channel_events().await.map(|_| ()),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                warn!(op, error = %e, "replay command failed");
                self.sink.emit(&Report::Error {
                    op,
                    message: e.to_string(),
                });
                failed += 1;
            }
        }

        let flushed = self.coordinator.shutdown().await?;
        self.sink.emit(&Report::Summary {
            commands: total,
            failed,
            flushed,
        });
        info!(commands = total, failed, "replay finished");
        Ok(failed)
    }

    async fn apply(&mut self, command: Command) -> Result<(), WebviewError> {
        match command {
            Command::Create {
                id,
                view_type,
                title,
                show_options,
                options,
                extension,
            } => {
                let mut request = CreatePanelRequest::new(id, view_type, title)
                    .show_options(show_options)
                    .options(options);
                if let Some(ext) = extension {
                    request = request.extension(ExtensionInfo::new(ext));
                }
                self.coordinator.create_panel(request).await
            }
            Command::Dispose { id } => self.coordinator.dispose_panel(&id).await,
            Command::Reveal { id, show_options } => {
                self.coordinator.reveal_panel(&id, show_options)
            }
            Command::SetTitle { id, title } => self.coordinator.set_title(&id, &title).await,
            Command::SetHtml { id, html } => self.coordinator.set_html(&id, &html),
            Command::PostMessage { id, payload } => {
                let delivered = self.coordinator.post_message(&id, payload).await;
                self.sink.emit(&Report::Delivered {
                    id: &id,
                    delivered,
                });
                Ok(())
            }
            Command::Layout { focused, groups } => {
                let layout = LayoutSnapshot {
                    focused: focused.as_ref().map(HeadlessHost::resource_for),
                    groups: groups
                        .iter()
                        .map(|g| VisibleGroup {
                            resource: g.panel.as_ref().map(HeadlessHost::resource_for),
                            column: g.column,
                        })
                        .collect(),
                };
                self.coordinator.reconcile_layout(&layout).await.map(|_| ())
            }
            Command::RegisterReviver { view_type } => {
                self.coordinator.register_content_reviver(&view_type)
            }
            Command::UnregisterReviver { view_type } => {
                self.coordinator.unregister_content_reviver(&view_type)
            }
            Command::StateUpdate { id, state } => {
                if !self.host.inject(&id, ChannelEvent::StateUpdated(state)) {
                    return Err(WebviewError::PanelNotFound(id.to_string()));
                }
                Ok(())
            }
            Command::Revive { id } => self.coordinator.revive_panel(&id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::tests::SharedBuf;
    use crate::headless::{CommandAllowList, JsonLinesProxy, LoggingActivation, LoggingOpener};
    use serde_json::json;
    use vista_webview::{CoordinatorDeps, CoordinatorSettings, MemoryStorage};

    async fn replayer(storage: MemoryStorage, buf: &SharedBuf) -> Replayer {
        let sink = Arc::new(JsonLines::new(Box::new(buf.clone())));
        let host = Arc::new(HeadlessHost::default());
        let deps = CoordinatorDeps {
            host: host.clone(),
            proxy: Arc::new(JsonLinesProxy::new(Arc::clone(&sink))),
            activation: Arc::new(LoggingActivation),
            opener: Arc::new(LoggingOpener),
            policy: Arc::new(CommandAllowList::default()),
            storage: Arc::new(storage),
        };
        let coordinator = WebviewPanelCoordinator::new(deps, CoordinatorSettings::default())
            .await
            .unwrap();
        Replayer::new(coordinator, host, sink)
    }

    fn events(lines: &[Value]) -> Vec<&str> {
        lines.iter().filter_map(|l| l["event"].as_str()).collect()
    }

    #[test]
    fn parses_tagged_commands() {
        let script = parse_script(
            r#"[
                {"op": "create", "id": "a", "view_type": "md.preview", "title": "A",
                 "show_options": {"viewColumn": 2}},
                {"op": "layout", "focused": "a", "groups": [{"panel": "a", "column": 2}]},
                {"op": "state_update", "id": "a", "state": {"scroll": 3}},
                {"op": "dispose", "id": "a"}
            ]"#,
        )
        .unwrap();
        assert_eq!(script.len(), 4);
        assert!(matches!(
            &script[0],
            Command::Create { show_options, .. } if show_options.view_column == Some(2)
        ));
        assert_eq!(script[2].op(), "state_update");
    }

    #[test]
    fn unknown_op_is_rejected() {
        let err = parse_script(r#"[{"op": "explode"}]"#).unwrap_err();
        assert!(err.to_string().contains("invalid replay script"));
    }

    #[tokio::test]
    async fn create_layout_dispose_prints_notifications() {
        let buf = SharedBuf::default();
        let script = parse_script(
            r#"[
                {"op": "create", "id": "a", "view_type": "md.preview", "title": "A"},
                {"op": "layout", "focused": "a", "groups": [{"column": 1}, {"panel": "a", "column": 2}]},
                {"op": "post_message", "id": "a", "payload": "hi"},
                {"op": "dispose", "id": "a"},
                {"op": "dispose", "id": "a"}
            ]"#,
        )
        .unwrap();

        let failed = replayer(MemoryStorage::new(), &buf)
            .await
            .run(script)
            .await
            .unwrap();
        assert_eq!(failed, 1);

        let lines = buf.lines();
        assert_eq!(
            events(&lines),
            vec!["init", "viewStateChanged", "delivered", "error", "summary"]
        );
        assert_eq!(
            lines[1]["state"],
            json!({"active": true, "visible": true, "position": 2})
        );
        assert_eq!(lines[2]["delivered"], true);
        assert_eq!(lines[3]["op"], "dispose");
    }

    #[tokio::test]
    async fn state_survives_into_revival() {
        let storage = MemoryStorage::new();
        let first = parse_script(
            r#"[
                {"op": "register_reviver", "view_type": "md.preview"},
                {"op": "create", "id": "a", "view_type": "md.preview", "title": "A"},
                {"op": "state_update", "id": "a", "state": {"scroll": 7}}
            ]"#,
        )
        .unwrap();
        let buf = SharedBuf::default();
        replayer(storage.clone(), &buf).await.run(first).await.unwrap();
        assert_eq!(buf.lines().last().unwrap()["flushed"], 1);

        let second = parse_script(r#"[{"op": "revive", "id": "a"}]"#).unwrap();
        let buf = SharedBuf::default();
        let failed = replayer(storage, &buf).await.run(second).await.unwrap();
        assert_eq!(failed, 0);

        let lines = buf.lines();
        let revived = lines
            .iter()
            .find(|l| l["event"] == "deserializePanel")
            .unwrap();
        assert_eq!(revived["viewType"], "md.preview");
        assert_eq!(revived["state"], json!({"scroll": 7}));
    }

    #[tokio::test]
    async fn state_update_for_unknown_panel_fails() {
        let buf = SharedBuf::default();
        let script = parse_script(r#"[{"op": "state_update", "id": "nope", "state": 1}]"#).unwrap();
        let failed = replayer(MemoryStorage::new(), &buf)
            .await
            .run(script)
            .await
            .unwrap();
        assert_eq!(failed, 1);
    }
}
