//! Location of the config file and first-run template creation.

use std::path::{Path, PathBuf};
use tracing::info;
use vista_common::ConfigError;

use super::template::default_config_toml;

const APP_DIR: &str = "vista";
const CONFIG_FILE: &str = "config.toml";

/// `<platform config dir>/vista/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .ok_or(ConfigError::NoConfigDir)
}

/// Write the commented template to `path`, creating missing parents.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| ConfigError::Io { path, source }
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    std::fs::write(path, default_config_toml()).map_err(io_error(path))?;

    info!(path = %path.display(), "default config written");
    Ok(())
}
