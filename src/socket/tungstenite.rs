//! Default transport over `tokio-tungstenite`.
//!
//! Each opened connection runs as one spawned tokio task. Outbound frames
//! travel through an unbounded channel owned by the [`TungsteniteHandle`];
//! inbound frames and lifecycle changes go out through [`SocketCallbacks`].

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;

use super::transport::{SocketCallbacks, SocketHandle, Transport};
use super::types::SocketError;

/// WebSocket transport backed by tokio-tungstenite with rustls.
///
/// `open` must be called from within a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteTransport;

#[derive(Debug)]
enum Outbound {
    Text(String),
    Close,
}

/// Sending side of one tungstenite connection task.
///
/// Dropping the handle ends the task the same way `close` does.
#[derive(Debug)]
pub struct TungsteniteHandle {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl SocketHandle for TungsteniteHandle {
    fn send(&self, text: &str) -> Result<(), SocketError> {
        self.tx
            .send(Outbound::Text(text.to_owned()))
            .map_err(|_| SocketError::Closed)
    }

    fn close(&self) {
        if self.tx.send(Outbound::Close).is_err() {
            tracing::debug!("close requested on finished connection");
        }
    }
}

impl Transport for TungsteniteTransport {
    type Handle = TungsteniteHandle;

    fn open(&self, target: &str, callbacks: SocketCallbacks) -> Result<Self::Handle, SocketError> {
        let request = target
            .into_client_request()
            .map_err(|e| SocketError::InvalidTarget(e.to_string()))?;
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|e| SocketError::NoRuntime(e.to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        runtime.spawn(run_connection(target.to_owned(), request, callbacks, rx));
        Ok(TungsteniteHandle { tx })
    }
}

async fn run_connection(
    target: String,
    request: Request,
    callbacks: SocketCallbacks,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
) {
    let stream = tokio::select! {
        result = connect_async(request) => match result {
            Ok((stream, _)) => stream,
            Err(e) => {
                tracing::debug!(%target, error = %e, "websocket handshake failed");
                callbacks.errored(e.to_string());
                return;
            }
        },
        () = closed_before_open(&mut rx) => {
            tracing::debug!(%target, "websocket closed before open");
            return;
        }
    };

    callbacks.opened();
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            outbound = rx.recv() => match outbound {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = write.send(Message::text(text)).await {
                        callbacks.errored(e.to_string());
                        return;
                    }
                }
                Some(Outbound::Close) | None => {
                    if let Err(e) = write.send(Message::Close(None)).await {
                        tracing::debug!(%target, error = %e, "close frame not sent");
                    }
                    callbacks.closed();
                    return;
                }
            },
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => callbacks.received(text.as_str()),
                // tungstenite queues the close reply; it leaves only on flush.
                Some(Ok(Message::Close(_))) => {
                    if let Err(e) = write.flush().await {
                        tracing::debug!(%target, error = %e, "close reply not sent");
                    }
                    callbacks.closed();
                    return;
                }
                None => {
                    callbacks.closed();
                    return;
                }
                // Binary frames are not part of the text contract; pings are answered by tungstenite.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    callbacks.errored(e.to_string());
                    return;
                }
            },
        }
    }
}

/// Resolves once the handle asks to close or is dropped.
async fn closed_before_open(rx: &mut mpsc::UnboundedReceiver<Outbound>) {
    while let Some(outbound) = rx.recv().await {
        match outbound {
            Outbound::Close => return,
            Outbound::Text(_) => tracing::warn!("dropping frame queued before open"),
        }
    }
}

#[cfg(test)]
#[path = "tungstenite_test.rs"]
mod tests;
