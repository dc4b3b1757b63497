//! Events delivered over a webview's content channel.

use serde_json::Value;

/// Events emitted by a webview component.
///
/// Each component hands the coordinator one receiver at creation; the
/// receiver is dropped together with the panel, so nothing fires after
/// disposal.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// A message posted by the webview content.
    Message(Value),
    /// The content published a new opaque state blob.
    StateUpdated(Value),
    /// The user clicked a link inside the content.
    LinkClicked(String),
    /// The webview was closed on the editor side.
    Disposed,
}
