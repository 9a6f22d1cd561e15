//! Transport boundary.
//!
//! The pipeline writes each response through a [`Connection`], issuing at
//! most one response per submitted request. [`ChannelTransport`] provides
//! the in-memory implementation used in tests and embedded deployments;
//! socket transports implement [`Connection`] the same way.

use bytes::Bytes;
use thiserror::Error;
use tokio::sync::mpsc;

/// Identifies the originating connection of a request.
pub type ConnectionId = u64;

/// Errors raised while delivering response bytes.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer side of the connection has gone away.
    #[error("connection {0} closed")]
    ConnectionClosed(ConnectionId),
}

/// Delivers response bytes back to a client.
///
/// Implementations must be safe to call from the result-sender task; `send`
/// must not block on the peer.
pub trait Connection: Send + Sync {
    /// Returns the connection's identifier.
    fn id(&self) -> ConnectionId;

    /// Queues response bytes for delivery to the peer.
    fn send(&self, bytes: Bytes) -> Result<(), TransportError>;
}

/// In-memory channel transport.
pub struct ChannelTransport;

impl ChannelTransport {
    /// Creates a connected pair: the server-side [`Connection`] handed to
    /// the pipeline and the client-side receiver that yields response bytes.
    pub fn pair(id: ConnectionId) -> (ChannelConnection, ResponseReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            ChannelConnection { id, tx },
            ResponseReceiver { id, rx },
        )
    }
}

/// Server-side half of an in-memory connection.
#[derive(Clone)]
pub struct ChannelConnection {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Bytes>,
}

impl Connection for ChannelConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn send(&self, bytes: Bytes) -> Result<(), TransportError> {
        self.tx
            .send(bytes)
            .map_err(|_| TransportError::ConnectionClosed(self.id))
    }
}

impl std::fmt::Debug for ChannelConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelConnection")
            .field("id", &self.id)
            .finish()
    }
}

/// Client-side half of an in-memory connection.
pub struct ResponseReceiver {
    id: ConnectionId,
    rx: mpsc::UnboundedReceiver<Bytes>,
}

impl ResponseReceiver {
    /// Returns the connection's identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Waits for the next response addressed to this connection.
    ///
    /// Returns `None` once the server side has been dropped and all queued
    /// responses were consumed.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }

    /// Attempts to take a queued response without waiting.
    pub fn try_recv(&mut self) -> Option<Bytes> {
        self.rx.try_recv().ok()
    }
}
