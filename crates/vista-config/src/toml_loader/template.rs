//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Vista Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[persistence]
# state_flush_interval_ms = 500               # 50-60000
# panel_namespace = "extension-webview-panels"
# state_namespace_prefix = "extension-webview/"

[storage]
# directory = "/path/to/storage"              # defaults to <data dir>/vista/storage

[links]
# standard_schemes = ["http", "https", "mailto"]

[resources]
# roots = []

[logging]
# level = "info"                              # trace, debug, info, warn, error
"##
    .to_string()
}
