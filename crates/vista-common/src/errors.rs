use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("no config directory on this platform")]
    NoConfigDir,

    #[error("config i/o error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store namespace '{namespace}' is corrupt: {reason}")]
    Corrupt { namespace: String, reason: String },
}

/// Errors raised by panel coordination.
///
/// Message delivery failures are deliberately absent: posting to a panel is
/// best-effort and reports `false` instead.
#[derive(Debug, thiserror::Error)]
pub enum WebviewError {
    #[error("webview panel {0} not found")]
    PanelNotFound(String),

    #[error("webview panel {0} already exists")]
    PanelAlreadyExists(String),

    #[error("no revival info for webview {0}")]
    NoRevivalInfo(String),

    #[error("extension {extension} is not permitted to execute {command}")]
    PermissionDenied { extension: String, command: String },

    #[error("a reviver is already registered for view type {0}")]
    ReviverAlreadyRegistered(String),

    #[error("no reviver registered for view type {0}")]
    ReviverNotRegistered(String),

    #[error("no plain webview with id {0}")]
    PlainWebviewNotFound(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("extension host error: {0}")]
    Host(String),

    #[error("webview component error: {0}")]
    Component(String),
}

#[derive(Debug, thiserror::Error)]
pub enum VistaError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Webview(#[from] WebviewError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
