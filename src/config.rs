//! Typed configuration for the connection manager and request client.
//!
//! Nothing here reads the environment implicitly. `from_env` is opt-in and
//! delegates to `from_lookup`, which takes any key lookup function.

use std::collections::BTreeMap;

pub const SOCKET_URL_VAR: &str = "NETSTATE_SOCKET_URL";
pub const HTTP_BASE_URL_VAR: &str = "NETSTATE_HTTP_BASE_URL";

/// Errors produced while building configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The connection target is not a `ws://` or `wss://` address.
    #[error("invalid connection target: {0}")]
    InvalidTarget(String),

    /// The request base URL is not an `http://` or `https://` address.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// A required variable was absent from the lookup.
    #[error("missing config value: {var} not set")]
    Missing { var: &'static str },

    /// A request URL names a scheme other than `http` or `https`.
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// A relative request URL was given but no base URL is configured.
    #[error("relative URL without base: {0}")]
    RelativeUrl(String),
}

// =============================================================================
// SOCKET
// =============================================================================

/// Connection target for a [`crate::socket::ConnectionManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketConfig {
    target: String,
}

impl SocketConfig {
    /// Validate and wrap a connection target.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTarget`] unless the target is a
    /// `ws://` or `wss://` URL with a host.
    pub fn new(target: impl Into<String>) -> Result<Self, ConfigError> {
        let target = target.into();
        let rest = target
            .strip_prefix("ws://")
            .or_else(|| target.strip_prefix("wss://"))
            .ok_or_else(|| ConfigError::InvalidTarget(target.clone()))?;
        if authority(rest).is_empty() {
            return Err(ConfigError::InvalidTarget(target));
        }
        Ok(Self { target })
    }

    /// Build from `NETSTATE_SOCKET_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or not a WebSocket URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is absent or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let target = lookup(SOCKET_URL_VAR).ok_or(ConfigError::Missing { var: SOCKET_URL_VAR })?;
        Self::new(target.trim())
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// Settings shared by every exchange issued from one [`crate::http::RequestClient`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestConfig {
    /// Origin that relative URLs resolve against. Trailing slashes are ignored.
    pub base_url: Option<String>,
    /// Headers sent with every request; per-call headers override them.
    pub default_headers: BTreeMap<String, String>,
}

impl RequestConfig {
    /// Set the base URL used for relative request paths.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] unless the base is `http(s)://`.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        if !is_absolute_http(base_url) {
            return Err(ConfigError::InvalidBaseUrl(base_url.to_owned()));
        }
        self.base_url = Some(base_url.trim_end_matches('/').to_owned());
        Ok(self)
    }

    #[must_use]
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Build from `NETSTATE_HTTP_BASE_URL`. An unset variable yields no base.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is set to a non-HTTP URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        match lookup(HTTP_BASE_URL_VAR) {
            Some(base) if !base.trim().is_empty() => Self::default().with_base_url(base.trim()),
            _ => Ok(Self::default()),
        }
    }

    /// Resolve a request URL against the configured base.
    ///
    /// Absolute `http(s)://` URLs pass through untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedScheme`] for absolute URLs with any
    /// other scheme, and [`ConfigError::RelativeUrl`] for a relative URL
    /// when no base is configured.
    pub fn resolve(&self, url: &str) -> Result<String, ConfigError> {
        if is_absolute_http(url) {
            return Ok(url.to_owned());
        }
        if let Some(scheme) = scheme(url) {
            return Err(ConfigError::UnsupportedScheme(scheme.to_owned()));
        }
        let base = self
            .base_url
            .as_deref()
            .ok_or_else(|| ConfigError::RelativeUrl(url.to_owned()))?
            .trim_end_matches('/');
        if url.starts_with('/') {
            Ok(format!("{base}{url}"))
        } else {
            Ok(format!("{base}/{url}"))
        }
    }
}

/// Scheme of an absolute `scheme://...` URL, if `url` has one.
fn scheme(url: &str) -> Option<&str> {
    let (scheme, _) = url.split_once("://")?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

fn is_absolute_http(url: &str) -> bool {
    url.strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .is_some_and(|rest| !authority(rest).is_empty())
}

fn authority(rest: &str) -> &str {
    rest.split(['/', '?', '#']).next().unwrap_or_default()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
