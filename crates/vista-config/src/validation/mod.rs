//! Full configuration validation.
//!
//! Each section has its own submodule; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod helpers;
mod links;
mod persistence;


use crate::schema::VistaConfig;
use vista_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &VistaConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    persistence::validate_persistence(&mut errors, config);
    links::validate_links(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
