//! Channel-based network client for one live connection.
//!
//! Spawns background reader/writer tasks and exposes channels so that the
//! session loop can send and receive frames without owning the socket.
//! One `NetClient` is one connection: a reconnect builds a new one and drops
//! the old.

use tokio::sync::mpsc;

use live_core::protocol::ClientMessage;

use crate::transport::{Transport, TransportError, TransportReader, TransportWriter};

/// Events produced by the background reader task.
#[derive(Debug)]
pub enum NetEvent {
    /// A raw text frame, not yet parsed.
    Frame(String),
    /// The connection failed. The channel closes right after.
    Error(String),
}

/// A channel-based client over one transport.
///
/// - [`incoming`](NetClient::incoming) yields [`NetEvent`]s. The channel
///   closing signals that the connection is gone.
/// - [`send`](NetClient::send) enqueues a [`ClientMessage`] without blocking.
pub struct NetClient {
    /// Receive raw server frames. Channel close = disconnected.
    pub incoming: mpsc::UnboundedReceiver<NetEvent>,
    /// Send-side of the writer channel (kept for [`Self::send`]).
    outgoing: mpsc::UnboundedSender<ClientMessage>,
}

impl NetClient {
    /// Create a `NetClient` over any [`Transport`] implementation.
    ///
    /// Splits the transport into read/write halves and spawns one task for
    /// each.
    pub fn from_transport<T: Transport>(transport: T) -> Self {
        let (reader, writer) = transport.split();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<ClientMessage>();

        Self::spawn_reader_task(reader, event_tx);
        Self::spawn_writer_task(writer, cmd_rx);

        Self {
            incoming: event_rx,
            outgoing: cmd_tx,
        }
    }

    /// Enqueue a [`ClientMessage`] for transmission.
    ///
    /// Fails only once the writer task has stopped.
    pub fn send(&self, msg: ClientMessage) -> Result<(), TransportError> {
        self.outgoing
            .send(msg)
            .map_err(|_| TransportError::ConnectionClosed)
    }

    fn spawn_reader_task<R: TransportReader>(
        mut reader: R,
        event_tx: mpsc::UnboundedSender<NetEvent>,
    ) {
        tokio::spawn(async move {
            loop {
                match reader.recv().await {
                    Ok(Some(frame)) => {
                        if event_tx.send(NetEvent::Frame(frame)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        let _ = event_tx.send(NetEvent::Error(e.to_string()));
                        break;
                    }
                }
            }
            // Reader done: the channel drops, signalling disconnect.
        });
    }

    fn spawn_writer_task<W: TransportWriter>(
        mut writer: W,
        mut cmd_rx: mpsc::UnboundedReceiver<ClientMessage>,
    ) {
        tokio::spawn(async move {
            while let Some(msg) = cmd_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(j) => j,
                    Err(e) => {
                        tracing::warn!(error = %e, "Could not encode outbound message");
                        continue;
                    }
                };
                if let Err(e) = writer.send(&json).await {
                    tracing::debug!(error = %e, "Writer stopped");
                    break;
                }
            }
        });
    }
}
