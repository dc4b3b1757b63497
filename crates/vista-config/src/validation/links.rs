//! Link scheme validation.

use regex::Regex;
use std::sync::LazyLock;

use crate::schema::VistaConfig;

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9+.\-]*$").expect("static scheme regex must compile"));

pub(crate) fn validate_links(errors: &mut Vec<String>, config: &VistaConfig) {
    for scheme in &config.links.standard_schemes {
        if !SCHEME_RE.is_match(scheme) {
            errors.push(format!(
                "links.standard_schemes contains invalid scheme '{scheme}'"
            ));
        } else if scheme == "command" {
            errors.push(
                "links.standard_schemes must not contain 'command' (command links are permission-checked)"
                    .to_string(),
            );
        }
    }
}
