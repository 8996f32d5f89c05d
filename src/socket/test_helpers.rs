//! In-memory transport whose events are fired by the test.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::transport::{SocketCallbacks, SocketHandle, Transport};
use super::types::SocketError;

/// One connection opened through a [`FakeTransport`].
pub struct FakeConnection {
    pub target: String,
    callbacks: SocketCallbacks,
    sent: Mutex<Vec<String>>,
    closed: AtomicBool,
    reject_sends: AtomicBool,
}

impl FakeConnection {
    pub fn fire_open(&self) {
        self.callbacks.opened();
    }

    pub fn fire_close(&self) {
        self.callbacks.closed();
    }

    pub fn fire_error(&self, reason: &str) {
        self.callbacks.errored(reason);
    }

    pub fn fire_message(&self, text: &str) {
        self.callbacks.received(text);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().expect("sent lock").clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn reject_sends(&self) {
        self.reject_sends.store(true, Ordering::SeqCst);
    }
}

pub struct FakeHandle(Arc<FakeConnection>);

impl SocketHandle for FakeHandle {
    fn send(&self, text: &str) -> Result<(), SocketError> {
        if self.0.is_closed() || self.0.reject_sends.load(Ordering::SeqCst) {
            return Err(SocketError::Closed);
        }
        self.0.sent.lock().expect("sent lock").push(text.to_owned());
        Ok(())
    }

    fn close(&self) {
        self.0.closed.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct FakeInner {
    connections: Vec<Arc<FakeConnection>>,
    fail_next: Option<String>,
}

/// Transport that records every open; clones share the same record.
#[derive(Clone, Default)]
pub struct FakeTransport {
    inner: Arc<Mutex<FakeInner>>,
}

impl FakeTransport {
    pub fn opened(&self) -> usize {
        self.inner.lock().expect("fake lock").connections.len()
    }

    pub fn connection(&self, index: usize) -> Arc<FakeConnection> {
        Arc::clone(&self.inner.lock().expect("fake lock").connections[index])
    }

    pub fn last(&self) -> Arc<FakeConnection> {
        let inner = self.inner.lock().expect("fake lock");
        Arc::clone(inner.connections.last().expect("no connection opened"))
    }

    /// Make the next `open` fail synchronously with `reason`.
    pub fn fail_next_open(&self, reason: &str) {
        self.inner.lock().expect("fake lock").fail_next = Some(reason.to_owned());
    }
}

impl Transport for FakeTransport {
    type Handle = FakeHandle;

    fn open(&self, target: &str, callbacks: SocketCallbacks) -> Result<FakeHandle, SocketError> {
        let mut inner = self.inner.lock().expect("fake lock");
        if let Some(reason) = inner.fail_next.take() {
            return Err(SocketError::InvalidTarget(reason));
        }
        let connection = Arc::new(FakeConnection {
            target: target.to_owned(),
            callbacks,
            sent: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            reject_sends: AtomicBool::new(false),
        });
        inner.connections.push(Arc::clone(&connection));
        Ok(FakeHandle(connection))
    }
}
