//! Observable connection state and the errors transports report.

use serde::{Deserialize, Serialize};

/// Stored in `last_error` when `send_message` runs without an open connection.
pub const NOT_CONNECTED_MESSAGE: &str = "WebSocket is not connected";

/// Stored in `last_error` when the transport reports an error event.
pub const CONNECTION_ERROR_MESSAGE: &str = "WebSocket connection error";

// =============================================================================
// ERROR
// =============================================================================

/// Failures raised by a [`super::Transport`] or [`super::SocketHandle`].
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    /// The connection target was rejected before any I/O happened.
    #[error("invalid connection target: {0}")]
    InvalidTarget(String),

    /// No async runtime is available to drive the connection.
    #[error("no async runtime available: {0}")]
    NoRuntime(String),

    /// The connection task is gone and can no longer accept frames.
    #[error("connection closed")]
    Closed,

    /// Any other transport failure.
    #[error("transport failure: {0}")]
    Transport(String),
}

// =============================================================================
// STATE
// =============================================================================

/// WebSocket connection status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    #[default]
    Disconnected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

/// One message in the connection history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub direction: Direction,
    pub content: String,
}

impl HistoryEntry {
    #[must_use]
    pub fn sent(content: impl Into<String>) -> Self {
        Self { direction: Direction::Sent, content: content.into() }
    }

    #[must_use]
    pub fn received(content: impl Into<String>) -> Self {
        Self { direction: Direction::Received, content: content.into() }
    }
}

/// Snapshot of everything a [`super::ConnectionManager`] exposes to observers.
///
/// `history` is append-only for the lifetime of the manager.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketState {
    pub status: ConnectionStatus,
    pub history: Vec<HistoryEntry>,
    pub last_error: Option<String>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
