//! Persistence section validation.

use crate::schema::VistaConfig;

use super::helpers::{validate_non_empty, validate_range};

pub(crate) fn validate_persistence(errors: &mut Vec<String>, config: &VistaConfig) {
    let p = &config.persistence;
    validate_range(
        errors,
        "persistence.state_flush_interval_ms",
        p.state_flush_interval_ms,
        50,
        60_000,
    );
    validate_non_empty(errors, "persistence.panel_namespace", &p.panel_namespace);
    validate_non_empty(
        errors,
        "persistence.state_namespace_prefix",
        &p.state_namespace_prefix,
    );

    // A shared prefix would let a view type's content state shadow panel records.
    if !p.state_namespace_prefix.is_empty() && p.panel_namespace.starts_with(&p.state_namespace_prefix)
    {
        errors.push(format!(
            "persistence.panel_namespace '{}' must not start with state_namespace_prefix '{}'",
            p.panel_namespace, p.state_namespace_prefix
        ));
    }
}
