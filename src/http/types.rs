//! Request client state, outcomes, and diagnostics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Extra header pairs for one request. Keys are unique.
pub type Headers = BTreeMap<String, String>;

// =============================================================================
// ERROR
// =============================================================================

/// Why an exchange failed. The `Display` text is the diagnostic string
/// stored in `last_error` and returned in [`RequestOutcome::error`].
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The server answered with a non-2xx status.
    #[error("HTTP error: status {0}")]
    Status(u16),

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body was not valid JSON for the expected type.
    #[error("invalid JSON response: {0}")]
    Decode(String),

    /// The request body could not be serialized.
    #[error("invalid JSON body: {0}")]
    Encode(String),

    /// A header name or value was rejected.
    #[error("invalid header: {0}")]
    Header(String),

    /// The request URL could not be resolved against the configuration.
    #[error(transparent)]
    Url(#[from] ConfigError),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl RequestError {
    /// HTTP status carried by the failure, if it came from the server.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            _ => None,
        }
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Flags shared by every exchange from one client.
///
/// `pending` is a single flag, not a counter: whichever exchange settles
/// first resets it even if others are still in flight.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestState {
    pub pending: bool,
    pub last_error: Option<String>,
}

/// Settled result of one exchange. `pending` is always `false` once returned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestOutcome<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub pending: bool,
}

impl<T> RequestOutcome<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self { data: Some(data), error: None, pending: false }
    }

    #[must_use]
    pub fn failed(error: &RequestError) -> Self {
        Self { data: None, error: Some(error.to_string()), pending: false }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
