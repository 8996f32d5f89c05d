//! Connection manager: owns at most one live connection.
//!
//! DESIGN
//! ======
//! The manager holds a single connection slot and a `watch` channel carrying
//! the observable [`SocketState`]. Every opened connection gets a fresh
//! connection id; the callbacks handed to the transport capture that id and
//! a weak reference to the shared state, so events from a connection that
//! has since been released are dropped instead of clobbering its successor.
//!
//! The slot lock is never held while calling into the transport.
//!
//! ERROR HANDLING
//! ==============
//! Nothing is returned to the caller. Transport failures, sends without a
//! connection, and refused opens all surface through `last_error`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;
use uuid::Uuid;

use super::transport::{SocketCallbacks, SocketHandle, Transport};
use super::tungstenite::TungsteniteTransport;
use super::types::{
    CONNECTION_ERROR_MESSAGE, ConnectionStatus, HistoryEntry, NOT_CONNECTED_MESSAGE, SocketState,
};
use crate::config::SocketConfig;

// =============================================================================
// SHARED STATE
// =============================================================================

enum Slot<H> {
    Empty,
    Opening(Uuid),
    Held(Uuid, Arc<H>),
}

impl<H> Slot<H> {
    fn id(&self) -> Option<Uuid> {
        match self {
            Self::Empty => None,
            Self::Opening(id) | Self::Held(id, _) => Some(*id),
        }
    }
}

struct Shared<H> {
    slot: Mutex<Slot<H>>,
    state: watch::Sender<SocketState>,
}

impl<H: SocketHandle> Shared<H> {
    fn slot(&self) -> MutexGuard<'_, Slot<H>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, id: Uuid) -> bool {
        self.slot().id() == Some(id)
    }

    /// Empty the slot if it still belongs to `id`, returning what was held.
    fn release(&self, id: Uuid) -> Option<Slot<H>> {
        let mut slot = self.slot();
        if slot.id() == Some(id) {
            Some(std::mem::replace(&mut *slot, Slot::Empty))
        } else {
            None
        }
    }

    fn update(&self, f: impl FnOnce(&mut SocketState)) {
        self.state.send_modify(f);
    }

    fn handle_open(&self, id: Uuid) {
        if !self.is_current(id) {
            tracing::debug!(connection_id = %id, "ignoring open from stale connection");
            return;
        }
        tracing::info!(connection_id = %id, "websocket connected");
        self.update(|s| {
            s.status = ConnectionStatus::Connected;
            s.last_error = None;
        });
    }

    fn handle_close(&self, id: Uuid) {
        if self.release(id).is_none() {
            return;
        }
        tracing::info!(connection_id = %id, "websocket closed");
        self.update(|s| s.status = ConnectionStatus::Disconnected);
    }

    fn handle_error(&self, id: Uuid, reason: &str) {
        let Some(released) = self.release(id) else {
            tracing::debug!(connection_id = %id, reason, "ignoring error from stale connection");
            return;
        };
        tracing::warn!(connection_id = %id, reason, "websocket error");
        if let Slot::Held(_, handle) = released {
            handle.close();
        }
        self.update(|s| {
            s.last_error = Some(CONNECTION_ERROR_MESSAGE.to_owned());
            s.status = ConnectionStatus::Disconnected;
        });
    }

    fn handle_message(&self, id: Uuid, text: String) {
        if !self.is_current(id) {
            return;
        }
        self.update(|s| s.history.push(HistoryEntry::received(text)));
    }
}

fn callbacks_for<H>(shared: Weak<Shared<H>>, id: Uuid) -> SocketCallbacks
where
    H: SocketHandle + Send + Sync + 'static,
{
    let open = shared.clone();
    let close = shared.clone();
    let error = shared.clone();
    SocketCallbacks::default()
        .on_open(move || {
            if let Some(shared) = open.upgrade() {
                shared.handle_open(id);
            }
        })
        .on_close(move || {
            if let Some(shared) = close.upgrade() {
                shared.handle_close(id);
            }
        })
        .on_error(move |reason| {
            if let Some(shared) = error.upgrade() {
                shared.handle_error(id, &reason);
            }
        })
        .on_message(move |text| {
            if let Some(shared) = shared.upgrade() {
                shared.handle_message(id, text);
            }
        })
}

// =============================================================================
// CONNECTION MANAGER
// =============================================================================

/// Stateful adapter over one bidirectional text connection.
///
/// Dropping the manager disconnects it.
pub struct ConnectionManager<T: Transport> {
    config: SocketConfig,
    transport: T,
    shared: Arc<Shared<T::Handle>>,
}

impl ConnectionManager<TungsteniteTransport> {
    /// Manager backed by the default tokio-tungstenite transport.
    #[must_use]
    pub fn tungstenite(config: SocketConfig) -> Self {
        Self::new(config, TungsteniteTransport)
    }
}

impl<T: Transport> ConnectionManager<T> {
    #[must_use]
    pub fn new(config: SocketConfig, transport: T) -> Self {
        let (state, _) = watch::channel(SocketState::default());
        let shared = Arc::new(Shared { slot: Mutex::new(Slot::Empty), state });
        Self { config, transport, shared }
    }

    /// Open a connection unless one is already held or opening.
    pub fn connect(&self) {
        let id = Uuid::new_v4();
        {
            let mut slot = self.shared.slot();
            if let Some(existing) = slot.id() {
                tracing::debug!(connection_id = %existing, "connect ignored; connection already held");
                return;
            }
            *slot = Slot::Opening(id);
        }

        tracing::debug!(connection_id = %id, target = self.config.target(), "websocket connecting");
        self.shared.update(|s| s.status = ConnectionStatus::Connecting);

        let callbacks = callbacks_for(Arc::downgrade(&self.shared), id);
        match self.transport.open(self.config.target(), callbacks) {
            Ok(handle) => {
                let orphan = {
                    let mut slot = self.shared.slot();
                    if matches!(*slot, Slot::Opening(current) if current == id) {
                        *slot = Slot::Held(id, Arc::new(handle));
                        None
                    } else {
                        Some(handle)
                    }
                };
                // Released while opening: close and forget it.
                if let Some(handle) = orphan {
                    handle.close();
                }
            }
            Err(e) => {
                tracing::warn!(connection_id = %id, error = %e, "websocket open failed");
                if self.shared.release(id).is_some() {
                    self.shared.update(|s| {
                        s.last_error = Some(e.to_string());
                        s.status = ConnectionStatus::Disconnected;
                    });
                }
            }
        }
    }

    /// Close and release the held connection without waiting for the handshake.
    pub fn disconnect(&self) {
        let taken = std::mem::replace(&mut *self.shared.slot(), Slot::Empty);
        match taken {
            Slot::Empty => return,
            Slot::Opening(id) => {
                tracing::debug!(connection_id = %id, "websocket disconnect while opening");
            }
            Slot::Held(id, handle) => {
                tracing::debug!(connection_id = %id, "websocket disconnect");
                handle.close();
            }
        }
        self.shared.update(|s| s.status = ConnectionStatus::Disconnected);
    }

    /// Transmit `content` verbatim if connected, recording it in history.
    pub fn send_message(&self, content: &str) {
        let handle = if self.status() == ConnectionStatus::Connected {
            match &*self.shared.slot() {
                Slot::Held(_, handle) => Some(Arc::clone(handle)),
                _ => None,
            }
        } else {
            None
        };

        let Some(handle) = handle else {
            tracing::debug!("send ignored; websocket is not connected");
            self.shared
                .update(|s| s.last_error = Some(NOT_CONNECTED_MESSAGE.to_owned()));
            return;
        };

        match handle.send(content) {
            Ok(()) => self
                .shared
                .update(|s| s.history.push(HistoryEntry::sent(content))),
            Err(e) => {
                tracing::warn!(error = %e, "websocket send failed");
                self.shared.update(|s| s.last_error = Some(e.to_string()));
            }
        }
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.shared.state.borrow().status
    }

    #[must_use]
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.shared.state.borrow().history.clone()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.shared.state.borrow().last_error.clone()
    }

    #[must_use]
    pub fn state(&self) -> SocketState {
        self.shared.state.borrow().clone()
    }

    /// Receiver that observes every state change from now on.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SocketState> {
        self.shared.state.subscribe()
    }

    /// Id of the held (or opening) connection, if any.
    #[must_use]
    pub fn connection_id(&self) -> Option<Uuid> {
        self.shared.slot().id()
    }

    /// Address every `connect` opens.
    #[must_use]
    pub fn target(&self) -> &str {
        self.config.target()
    }
}

impl<T: Transport> Drop for ConnectionManager<T> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
