//! Authorization of links clicked inside webview content.

use serde_json::Value;
use vista_common::WebviewError;

use crate::host::CommandPolicy;
use crate::types::{ExtensionInfo, WebviewOptions};

/// Scheme of `command:` links.
pub const COMMAND_SCHEME: &str = "command";

/// What to do with a clicked link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDecision {
    Open,
    Ignore,
}

/// A parsed `command:<id>?<args>` link.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandLink {
    pub id: String,
    pub args: Vec<Value>,
}

/// Lowercased scheme of a URI, if it has one.
pub fn scheme_of(uri: &str) -> Option<String> {
    let (scheme, _) = uri.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic()
        || !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return None;
    }
    Some(scheme.to_ascii_lowercase())
}

/// Parse a command link. The query is a percent-encoded JSON value; an
/// array is spread into arguments, anything else is a single argument, and
/// an unparseable query yields no arguments.
pub fn parse_command_link(uri: &str) -> Option<CommandLink> {
    let (scheme, rest) = uri.split_once(':')?;
    if !scheme.eq_ignore_ascii_case(COMMAND_SCHEME) {
        return None;
    }
    let (id, query) = match rest.split_once('?') {
        Some((id, query)) => (id, Some(query)),
        None => (rest, None),
    };
    if id.is_empty() {
        return None;
    }

    let args = query
        .and_then(|q| urlencoding::decode(q).ok())
        .and_then(|q| serde_json::from_str::<Value>(&q).ok())
        .map(|v| match v {
            Value::Array(items) => items,
            other => vec![other],
        })
        .unwrap_or_default();

    Some(CommandLink {
        id: id.to_string(),
        args,
    })
}

/// Decide whether a link clicked in a panel may be opened.
///
/// Standard schemes always open. Command links open only when the panel
/// enables them and `policy` permits the command for the owning extension;
/// a refusal is a [`WebviewError::PermissionDenied`].
pub fn authorize_link(
    uri: &str,
    standard_schemes: &[String],
    options: &WebviewOptions,
    extension: &ExtensionInfo,
    policy: &dyn CommandPolicy,
) -> Result<LinkDecision, WebviewError> {
    let Some(scheme) = scheme_of(uri) else {
        return Ok(LinkDecision::Ignore);
    };

    if standard_schemes.iter().any(|s| *s == scheme) {
        return Ok(LinkDecision::Open);
    }

    if options.enable_command_uris && scheme == COMMAND_SCHEME {
        let Some(command) = parse_command_link(uri) else {
            return Ok(LinkDecision::Ignore);
        };
        if !policy.is_permitted(&command.id, extension, &command.args) {
            return Err(WebviewError::PermissionDenied {
                extension: extension.id.clone(),
                command: command.id,
            });
        }
        return Ok(LinkDecision::Open);
    }

    Ok(LinkDecision::Ignore)
}
