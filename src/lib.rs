//! Reactive state adapters for network primitives.
//!
//! DESIGN
//! ======
//! Two independent units, each a thin stateful wrapper over one platform call:
//!
//! - [`socket::ConnectionManager`] owns at most one bidirectional WebSocket
//!   connection and mirrors its lifecycle plus message history into
//!   observable [`socket::SocketState`].
//! - [`http::RequestClient`] performs JSON request/response exchanges and
//!   tracks a shared `pending` flag and the last error in
//!   [`http::RequestState`].
//!
//! Neither unit throws past its boundary: failures land in the observed
//! state as diagnostic strings. Observers subscribe through
//! `tokio::sync::watch` receivers.

pub mod config;
pub mod http;
pub mod socket;

pub use config::{ConfigError, RequestConfig, SocketConfig};
pub use http::{RequestClient, RequestOutcome, RequestState};
pub use socket::{ConnectionManager, ConnectionStatus, Direction, HistoryEntry, SocketState};
