//! Vista configuration system.
//!
//! TOML-based configuration for the webview panel coordinator. All
//! sections use defaults so partial configs work out of the box.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    state_namespace, LinksConfig, LogLevel, LoggingConfig, PersistenceConfig, ResourcesConfig,
    StorageConfig, VistaConfig, CONFIG_SCHEMA_VERSION,
};

use std::path::Path;
use vista_common::ConfigError;

/// Load and validate config from the platform default path.
pub fn load_config() -> Result<VistaConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Load and validate config from an explicit path.
pub fn load_config_from(path: &Path) -> Result<VistaConfig, ConfigError> {
    let config = toml_loader::load_from_path(path)?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &VistaConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
