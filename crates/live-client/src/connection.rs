//! Connection manager: one live transport at a time, reconnected forever.
//!
//! The manager is a small state machine driven by [`ConnectionManager::next_event`]:
//!
//! ```text
//! Connecting ──ok──▶ Open ──close/error──▶ Waiting(delay) ──▶ Connecting
//!     └──────────────fail──────────────────────▲
//! ```
//!
//! Every close, including a failed connect attempt, schedules exactly one new
//! attempt after [`ReconnectPolicy::delay`]. There is no backoff growth and no
//! retry cap. `next_event` is cancel-safe, so it can sit in a `tokio::select!`
//! next to user input.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use live_core::game_state::ConnectionState;
use live_core::protocol::ClientMessage;

use crate::net_client::{NetClient, NetEvent};
use crate::transport::{Connector, TransportError};

/// Fixed delay before each reconnect attempt.
pub const RECONNECT_DELAY_MS: u64 = 3_000;

/// When to retry after a connection is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(RECONNECT_DELAY_MS),
        }
    }
}

/// What happened on the connection.
#[derive(Debug)]
pub enum ConnectionEvent {
    /// A connect attempt started.
    Connecting,
    /// The transport is up; sends go through.
    Open,
    /// A raw inbound frame.
    Frame(String),
    /// The transport reported an error. A [`ConnectionEvent::Closed`] follows.
    Error(String),
    /// The transport is gone; a reconnect is scheduled.
    Closed,
}

type PendingConnect<C> = JoinHandle<Result<<C as Connector>::Transport, TransportError>>;

enum Phase<C: Connector> {
    /// Nothing started yet.
    Idle,
    Connecting(PendingConnect<C>),
    /// A connect attempt failed with this error; report it, then close.
    Failed(String),
    Open(NetClient),
    /// Waiting for the reconnect deadline.
    Waiting(Instant),
}

/// Owns the current connection to one endpoint.
pub struct ConnectionManager<C: Connector> {
    connector: Arc<C>,
    url: String,
    policy: ReconnectPolicy,
    phase: Phase<C>,
    attempts: u64,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            connector: Arc::new(connector),
            url: url.into(),
            policy,
            phase: Phase::Idle,
            attempts: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Number of connect attempts started so far, the first one included.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn state(&self) -> ConnectionState {
        match self.phase {
            Phase::Open(_) => ConnectionState::Open,
            Phase::Idle | Phase::Connecting(_) => ConnectionState::Connecting,
            Phase::Failed(_) | Phase::Waiting(_) => ConnectionState::Closed,
        }
    }

    /// Send a message if the connection is open; drop it otherwise.
    ///
    /// Nothing is queued for later: a command issued while disconnected is
    /// lost.
    pub fn send(&self, msg: ClientMessage) {
        match &self.phase {
            Phase::Open(net) => {
                if let Err(e) = net.send(msg) {
                    tracing::debug!(error = %e, "Dropping outbound message");
                }
            }
            _ => tracing::debug!(?msg, "Not connected; dropping outbound message"),
        }
    }

    /// Drive the connection and return the next event.
    pub async fn next_event(&mut self) -> ConnectionEvent {
        match &mut self.phase {
            Phase::Idle => self.start_attempt(),
            Phase::Connecting(handle) => {
                let result = handle.await;
                match result {
                    Ok(Ok(transport)) => {
                        tracing::info!(url = %self.url, "Connection open");
                        self.phase = Phase::Open(NetClient::from_transport(transport));
                        ConnectionEvent::Open
                    }
                    Ok(Err(e)) => {
                        self.phase = Phase::Failed(e.to_string());
                        ConnectionEvent::Error(e.to_string())
                    }
                    Err(e) => {
                        self.phase = Phase::Failed(e.to_string());
                        ConnectionEvent::Error(format!("connect task failed: {e}"))
                    }
                }
            }
            Phase::Failed(reason) => {
                tracing::warn!(url = %self.url, %reason, "Connect attempt failed");
                self.schedule_reconnect()
            }
            Phase::Open(net) => match net.incoming.recv().await {
                Some(NetEvent::Frame(frame)) => ConnectionEvent::Frame(frame),
                Some(NetEvent::Error(e)) => {
                    tracing::warn!(url = %self.url, error = %e, "Connection error");
                    ConnectionEvent::Error(e)
                }
                None => {
                    tracing::info!(url = %self.url, "Connection closed");
                    self.schedule_reconnect()
                }
            },
            Phase::Waiting(deadline) => {
                sleep_until(*deadline).await;
                self.start_attempt()
            }
        }
    }

    fn start_attempt(&mut self) -> ConnectionEvent {
        self.attempts += 1;
        tracing::debug!(url = %self.url, attempt = self.attempts, "Connecting");
        let connector = Arc::clone(&self.connector);
        let url = self.url.clone();
        let handle = tokio::spawn(async move { connector.connect(&url).await });
        self.phase = Phase::Connecting(handle);
        ConnectionEvent::Connecting
    }

    /// Drop the current connection, if any, and arm the single reconnect timer.
    fn schedule_reconnect(&mut self) -> ConnectionEvent {
        let deadline = Instant::now() + self.policy.delay;
        tracing::info!(
            url = %self.url,
            delay_ms = self.policy.delay.as_millis() as u64,
            "Reconnect scheduled"
        );
        self.phase = Phase::Waiting(deadline);
        ConnectionEvent::Closed
    }
}

impl<C: Connector> Drop for ConnectionManager<C> {
    fn drop(&mut self) {
        if let Phase::Connecting(handle) = &self.phase {
            handle.abort();
        }
    }
}
