//! The session object.
//!
//! Owns a [`ConnectionManager`] and a [`ClientGameState`] and is the single
//! writer of that state. Transport events, user intents and announcement
//! timers are all funnelled into one loop, so they are applied strictly one
//! after another in arrival order.
//!
//! Frontends only need to:
//! 1. Build a controller with [`ClientController::new`] (or
//!    [`ClientController::connect_ws`]).
//! 2. Either call [`ClientController::run`] with a [`Frontend`], or drive
//!    [`ClientController::recv`] and [`ClientController::handle_intent`]
//!    from their own loop.

use std::time::Duration;

use tokio::sync::mpsc;

use live_core::commands::{CommandError, Confirm, UserIntent};
use live_core::dispatch::parse_server_frame;
use live_core::game_state::{ClientGameState, ConnectionState, StateChanged};

use crate::connection::{ConnectionEvent, ConnectionManager, ReconnectPolicy};
use crate::transport::Connector;

/// Outcome of processing a single session event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollResult {
    /// State was updated; the flags describe what was modified.
    Updated(StateChanged),
    /// The event was consumed without touching state (dropped frame, stale
    /// timer).
    Unchanged,
}

/// Timer callbacks delivered back into the session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    HideAnnouncement,
}

/// What a frontend plugs into [`ClientController::run`].
pub trait Frontend: Confirm {
    /// Show the state after something changed.
    fn render(&mut self, state: &ClientGameState, changed: StateChanged);

    /// Tell the user why an intent was not sent.
    fn rejected(&mut self, error: &CommandError);
}

/// Owns the connection and the projected state.
pub struct ClientController<C: Connector> {
    connection: ConnectionManager<C>,
    pub state: ClientGameState,
    timers_tx: mpsc::UnboundedSender<TimerEvent>,
    timers_rx: mpsc::UnboundedReceiver<TimerEvent>,
}

#[cfg(feature = "native")]
impl ClientController<crate::ws_transport::WsConnector> {
    /// Session over a real WebSocket (e.g. `ws://host/ws/room-id`).
    pub fn connect_ws(url: &str, policy: ReconnectPolicy) -> Self {
        Self::new(crate::ws_transport::WsConnector, url, policy)
    }
}

impl<C: Connector> ClientController<C> {
    /// Build a session. Nothing connects until the first [`Self::recv`].
    pub fn new(connector: C, url: &str, policy: ReconnectPolicy) -> Self {
        let (timers_tx, timers_rx) = mpsc::unbounded_channel();
        Self {
            connection: ConnectionManager::new(connector, url, policy),
            state: ClientGameState::new(),
            timers_tx,
            timers_rx,
        }
    }

    /// Borrow the projected state.
    pub fn game_state(&self) -> &ClientGameState {
        &self.state
    }

    pub fn connection(&self) -> &ConnectionManager<C> {
        &self.connection
    }

    /// Await the next transport or timer event and apply it.
    ///
    /// Cancel-safe; suitable for `tokio::select!` loops.
    pub async fn recv(&mut self) -> PollResult {
        tokio::select! {
            event = self.connection.next_event() => self.on_connection_event(event),
            Some(timer) = self.timers_rx.recv() => self.on_timer(timer),
        }
    }

    /// Parse one raw frame and fold it into the state.
    ///
    /// Malformed frames and unknown types are dropped without touching state.
    pub fn dispatch(&mut self, raw: &str) -> PollResult {
        let Some(msg) = parse_server_frame(raw) else {
            return PollResult::Unchanged;
        };
        let changed = self.state.apply_server_message(&msg);
        if changed.announcement
            && let Some(banner) = &self.state.announcement
        {
            self.schedule_hide(banner.duration);
        }
        updated(changed)
    }

    /// Validate a user intent and send the resulting message.
    ///
    /// The send itself is best effort: if the connection is not open the
    /// message is dropped.
    pub fn handle_intent(
        &mut self,
        intent: UserIntent,
        confirm: &dyn Confirm,
    ) -> Result<StateChanged, CommandError> {
        let (msg, changed) = self.state.command(intent, confirm)?;
        tracing::debug!(?msg, "Sending command");
        self.connection.send(msg);
        Ok(changed)
    }

    /// Run the session until the intent channel closes.
    pub async fn run<F: Frontend>(
        &mut self,
        mut intents: mpsc::UnboundedReceiver<UserIntent>,
        frontend: &mut F,
    ) {
        frontend.render(&self.state, StateChanged::default());
        loop {
            tokio::select! {
                poll = self.recv() => {
                    if let PollResult::Updated(changed) = poll {
                        frontend.render(&self.state, changed);
                    }
                }
                intent = intents.recv() => {
                    let Some(intent) = intent else {
                        tracing::info!("Intent channel closed; ending session");
                        return;
                    };
                    match self.handle_intent(intent, &*frontend) {
                        Ok(changed) => {
                            if changed.any() {
                                frontend.render(&self.state, changed);
                            }
                        }
                        Err(e) => frontend.rejected(&e),
                    }
                }
            }
        }
    }

    // -- private -----------------------------------------------------------

    fn on_connection_event(&mut self, event: ConnectionEvent) -> PollResult {
        match event {
            ConnectionEvent::Connecting => updated(self.state.set_connection(ConnectionState::Connecting)),
            ConnectionEvent::Open => updated(self.state.set_connection(ConnectionState::Open)),
            ConnectionEvent::Frame(raw) => self.dispatch(&raw),
            ConnectionEvent::Error(_) => updated(self.state.connection_error()),
            ConnectionEvent::Closed => updated(self.state.set_connection(ConnectionState::Closed)),
        }
    }

    fn on_timer(&mut self, timer: TimerEvent) -> PollResult {
        match timer {
            TimerEvent::HideAnnouncement => updated(self.state.hide_announcement()),
        }
    }

    /// One-shot: never cancelled, even if a newer banner replaces this one.
    fn schedule_hide(&self, after: Duration) {
        let tx = self.timers_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(TimerEvent::HideAnnouncement);
        });
    }
}

fn updated(changed: StateChanged) -> PollResult {
    if changed.any() {
        PollResult::Updated(changed)
    } else {
        PollResult::Unchanged
    }
}
