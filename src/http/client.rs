//! Request client: JSON request/response exchanges with shared state.
//!
//! DESIGN
//! ======
//! `get`/`post`/`put`/`delete` all delegate to [`RequestClient::request`]
//! with a fixed verb. Every call sets `pending` and clears `last_error` on
//! start; on settlement it resets `pending` and, on failure, records the
//! diagnostic. The flags are shared across calls, so overlapping exchanges
//! race for the visible state and the last to settle wins.
//!
//! `pending` is reset by a guard, so a dropped (cancelled) future settles
//! the flag too.
//!
//! Header precedence, lowest first: `Content-Type: application/json`,
//! configured default headers, per-call headers.

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;

use super::types::{Headers, RequestError, RequestOutcome, RequestState};
use crate::config::RequestConfig;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Marks the shared state pending until settled or dropped.
struct PendingGuard<'a> {
    state: &'a watch::Sender<RequestState>,
    armed: bool,
}

impl<'a> PendingGuard<'a> {
    fn start(state: &'a watch::Sender<RequestState>) -> Self {
        state.send_modify(|s| {
            s.pending = true;
            s.last_error = None;
        });
        Self { state, armed: true }
    }

    fn settle(mut self, error: Option<String>) {
        self.armed = false;
        self.state.send_modify(|s| {
            s.pending = false;
            if error.is_some() {
                s.last_error = error;
            }
        });
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_modify(|s| s.pending = false);
        }
    }
}

/// Stateful JSON HTTP client.
pub struct RequestClient {
    http: reqwest::Client,
    config: RequestConfig,
    state: watch::Sender<RequestState>,
}

impl RequestClient {
    /// Build a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::ClientBuild`] if the HTTP client (TLS backend)
    /// cannot be initialized.
    pub fn new(config: RequestConfig) -> Result<Self, RequestError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| RequestError::ClientBuild(e.to_string()))?;
        let (state, _) = watch::channel(RequestState::default());
        Ok(Self { http, config, state })
    }

    pub async fn get(&self, url: &str, headers: Option<&Headers>) -> RequestOutcome<Value> {
        self.request::<Value, Value>(Method::GET, url, None, headers)
            .await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: Option<&B>,
        headers: Option<&Headers>,
    ) -> RequestOutcome<Value> {
        self.request(Method::POST, url, body, headers).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: Option<&B>,
        headers: Option<&Headers>,
    ) -> RequestOutcome<Value> {
        self.request(Method::PUT, url, body, headers).await
    }

    pub async fn delete(&self, url: &str, headers: Option<&Headers>) -> RequestOutcome<Value> {
        self.request::<Value, Value>(Method::DELETE, url, None, headers)
            .await
    }

    /// Perform one exchange and decode the JSON response body into `T`.
    ///
    /// Never fails outright: errors come back in [`RequestOutcome::error`]
    /// and are mirrored into `last_error`.
    pub async fn request<T, B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        headers: Option<&Headers>,
    ) -> RequestOutcome<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let guard = PendingGuard::start(&self.state);
        tracing::debug!(%method, url, "request started");

        match self.exchange(&method, url, body, headers).await {
            Ok(data) => {
                guard.settle(None);
                RequestOutcome::ok(data)
            }
            Err(e) => {
                tracing::warn!(%method, url, error = %e, "request failed");
                guard.settle(Some(e.to_string()));
                RequestOutcome::failed(&e)
            }
        }
    }

    async fn exchange<T, B>(
        &self,
        method: &Method,
        url: &str,
        body: Option<&B>,
        headers: Option<&Headers>,
    ) -> Result<T, RequestError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let resolved = self.config.resolve(url)?;
        let header_map = self.header_map(headers)?;

        let mut request = self
            .http
            .request(method.clone(), &resolved)
            .headers(header_map);
        if let Some(body) = body {
            let payload = serde_json::to_vec(body).map_err(|e| RequestError::Encode(e.to_string()))?;
            request = request.body(payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        let status = response.status();
        tracing::debug!(%method, url = %resolved, status = status.as_u16(), "response received");
        if !status.is_success() {
            return Err(RequestError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| RequestError::Decode(e.to_string()))
    }

    fn header_map(&self, extra: Option<&Headers>) -> Result<HeaderMap, RequestError> {
        let mut map = HeaderMap::new();
        map.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        let layers = std::iter::once(&self.config.default_headers).chain(extra);
        for (name, value) in layers.flatten() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| RequestError::Header(name.clone()))?;
            let header_value = HeaderValue::from_str(value).map_err(|_| RequestError::Header(name.clone()))?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    #[must_use]
    pub fn pending(&self) -> bool {
        self.state.borrow().pending
    }

    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    #[must_use]
    pub fn state(&self) -> RequestState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change from now on.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
