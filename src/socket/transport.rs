//! Transport seam for the connection manager.
//!
//! A [`Transport`] opens one connection per call and reports lifecycle
//! events through the four slots of [`SocketCallbacks`]. Any implementation
//! honoring that contract can back a [`super::ConnectionManager`].

use super::types::SocketError;

type Hook = Box<dyn Fn() + Send + Sync>;
type TextHook = Box<dyn Fn(String) + Send + Sync>;

/// Opens bidirectional text connections.
pub trait Transport {
    type Handle: SocketHandle + Send + Sync + 'static;

    /// Start opening a connection to `target` without waiting for it.
    ///
    /// Events for the new connection are delivered through `callbacks`,
    /// either from another task at any later point or synchronously from
    /// within this call.
    ///
    /// # Errors
    ///
    /// Returns an error if the attempt cannot even be started, such as a
    /// malformed target or a missing runtime.
    fn open(&self, target: &str, callbacks: SocketCallbacks) -> Result<Self::Handle, SocketError>;
}

/// Owned reference to one live connection.
pub trait SocketHandle {
    /// Queue a text frame for transmission.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection can no longer carry frames.
    fn send(&self, text: &str) -> Result<(), SocketError>;

    /// Request closure. Does not wait for the close handshake.
    fn close(&self);
}

/// The four lifecycle slots a transport fires: open, close, error, message.
pub struct SocketCallbacks {
    on_open: Hook,
    on_close: Hook,
    on_error: TextHook,
    on_message: TextHook,
}

impl Default for SocketCallbacks {
    fn default() -> Self {
        Self {
            on_open: Box::new(|| {}),
            on_close: Box::new(|| {}),
            on_error: Box::new(|_| {}),
            on_message: Box::new(|_| {}),
        }
    }
}

impl std::fmt::Debug for SocketCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketCallbacks").finish_non_exhaustive()
    }
}

impl SocketCallbacks {
    #[must_use]
    pub fn on_open(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_open = Box::new(f);
        self
    }

    #[must_use]
    pub fn on_close(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_close = Box::new(f);
        self
    }

    #[must_use]
    pub fn on_error(mut self, f: impl Fn(String) + Send + Sync + 'static) -> Self {
        self.on_error = Box::new(f);
        self
    }

    #[must_use]
    pub fn on_message(mut self, f: impl Fn(String) + Send + Sync + 'static) -> Self {
        self.on_message = Box::new(f);
        self
    }

    pub fn opened(&self) {
        (self.on_open)();
    }

    pub fn closed(&self) {
        (self.on_close)();
    }

    pub fn errored(&self, reason: impl Into<String>) {
        (self.on_error)(reason.into());
    }

    pub fn received(&self, text: impl Into<String>) {
        (self.on_message)(text.into());
    }
}
