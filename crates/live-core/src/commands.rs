//! Turning user intents into outbound messages.
//!
//! Each intent is checked against the projected state before anything is
//! emitted. A rejected intent returns a [`CommandError`] for the frontend to
//! show and sends nothing.

use thiserror::Error;

use crate::game_state::{ClientGameState, GenerationStatus, StateChanged};
use crate::protocol::{BroadcasterLink, ClientMessage, GameMode};

/// Delay between automatic rounds when the input is not a usable number.
pub const DEFAULT_AUTO_PLAY_DELAY_SECS: u32 = 15;

/// Leading character of a broadcaster handle.
pub const HANDLE_PREFIX: char = '@';

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    /// Attach the server to this broadcaster's live chat.
    ConnectBroadcaster { username: String },
    SetGameMode(GameMode),
    StartRound,
    /// Start or stop automatic rounds. `delay_input` is the raw text of the
    /// delay field.
    ToggleAutoPlay { delay_input: String },
    ResetLeaderboard,
    /// Generate an image from the collected parts with the named backend.
    Generate { api: String },
}

/// Why an intent was not sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Please enter a valid TikTok username, starting with @.")]
    InvalidUsername,

    #[error("Already connected or connecting to a broadcaster.")]
    BroadcasterBusy,

    #[error("A monster is already being generated.")]
    GenerationPending,

    #[error("Not connected to the game server.")]
    NotConnected,

    #[error("Leaderboard reset was not confirmed.")]
    NotConfirmed,
}

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, question: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, question: &str) -> bool {
        self(question)
    }
}

/// Parse the auto-play delay field, falling back to
/// [`DEFAULT_AUTO_PLAY_DELAY_SECS`] for anything that is not a positive integer.
pub fn parse_delay(input: &str) -> u32 {
    match input.trim().parse::<u32>() {
        Ok(d) if d > 0 => d,
        _ => DEFAULT_AUTO_PLAY_DELAY_SECS,
    }
}

/// Check a broadcaster handle: non-empty and starting with [`HANDLE_PREFIX`].
pub fn validate_username(username: &str) -> Result<(), CommandError> {
    if username.is_empty() || !username.starts_with(HANDLE_PREFIX) {
        return Err(CommandError::InvalidUsername);
    }
    Ok(())
}

impl ClientGameState {
    /// Validate an intent and build the message to send.
    ///
    /// Some intents also update local feedback state (the broadcaster link
    /// shows "connecting", a generation request becomes pending); those
    /// changes are returned alongside the message.
    pub fn command(
        &mut self,
        intent: UserIntent,
        confirm: &dyn Confirm,
    ) -> Result<(ClientMessage, StateChanged), CommandError> {
        let mut changed = StateChanged::default();

        let msg = match intent {
            UserIntent::ConnectBroadcaster { username } => {
                validate_username(&username)?;
                if !self.is_open() {
                    return Err(CommandError::NotConnected);
                }
                if !self.broadcaster.accepts_connect() {
                    return Err(CommandError::BroadcasterBusy);
                }
                self.broadcaster.link = BroadcasterLink::Connecting;
                self.broadcaster.message = format!("Connecting to {username}...");
                changed.broadcaster = true;
                ClientMessage::ConnectTiktok {
                    username: Some(username),
                }
            }
            UserIntent::SetGameMode(mode) => ClientMessage::SetGameMode { mode },
            UserIntent::StartRound => ClientMessage::StartRound,
            UserIntent::ToggleAutoPlay { delay_input } => {
                // Decided from the last server-confirmed value only.
                if self.auto_play_running {
                    ClientMessage::StopAutoPlay
                } else {
                    ClientMessage::StartAutoPlay {
                        delay: parse_delay(&delay_input),
                    }
                }
            }
            UserIntent::ResetLeaderboard => {
                if !confirm.confirm("Are you sure you want to reset the leaderboard?") {
                    return Err(CommandError::NotConfirmed);
                }
                ClientMessage::ResetLeaderboard
            }
            UserIntent::Generate { api } => {
                if self.generation.is_pending() {
                    return Err(CommandError::GenerationPending);
                }
                if !self.is_open() {
                    return Err(CommandError::NotConnected);
                }
                self.generation = GenerationStatus::Pending;
                self.status = "Sending request to server...".to_string();
                changed.generation = true;
                changed.status = true;
                ClientMessage::GenerateMonster { api }
            }
        };

        Ok((msg, changed))
    }
}
