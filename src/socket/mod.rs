//! Connection manager: one bidirectional text connection mirrored into state.
//!
//! - `types`: observable state, history entries, fixed diagnostics, errors.
//! - `transport`: the transport seam and its four callback slots.
//! - `manager`: [`ConnectionManager`] itself.
//! - `tungstenite`: the default tokio-tungstenite transport.

pub mod manager;
pub mod transport;
pub mod tungstenite;
pub mod types;

#[cfg(test)]
pub mod test_helpers;

pub use manager::ConnectionManager;
pub use transport::{SocketCallbacks, SocketHandle, Transport};
pub use tungstenite::{TungsteniteHandle, TungsteniteTransport};
pub use types::{
    CONNECTION_ERROR_MESSAGE, ConnectionStatus, Direction, HistoryEntry, NOT_CONNECTED_MESSAGE,
    SocketError, SocketState,
};
