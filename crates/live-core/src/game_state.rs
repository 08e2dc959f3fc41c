use std::time::Duration;

use crate::protocol::{BroadcasterLink, ScoreEntry, ServerMessage};
use crate::transcript::{ChatLine, Transcript};

/// How long the "New Round" banner stays up.
pub const NEW_ROUND_ANNOUNCEMENT: Duration = Duration::from_millis(3_000);
/// How long the round summary stays up.
pub const ROUND_OVER_ANNOUNCEMENT: Duration = Duration::from_millis(5_000);
/// How long the "connected to the stream" banner stays up.
pub const BROADCASTER_ANNOUNCEMENT: Duration = Duration::from_millis(3_000);

/// State of the session's link to the game server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// Which prompt label a round is shown with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeLabel {
    #[default]
    Plain,
    Hard,
}

impl ModeLabel {
    /// The server capitalises mode names; only `Hard` changes the label.
    pub fn from_mode_name(mode: &str) -> Self {
        if mode == "Hard" {
            ModeLabel::Hard
        } else {
            ModeLabel::Plain
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            ModeLabel::Plain => "Type this:",
            ModeLabel::Hard => "Unscramble this:",
        }
    }
}

/// The round currently (or most recently) on screen.
///
/// Survives `round_over`; only the next `new_round` replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoundState {
    pub mode: ModeLabel,
    /// Mode name as sent by the server, e.g. `"Classic"`.
    pub mode_name: String,
    pub word: String,
    /// Last value pushed by the server. Never counted down locally.
    pub remaining_seconds: i64,
}

impl RoundState {
    pub fn new(mode_name: &str, word: &str, round_time: i64) -> Self {
        Self {
            mode: ModeLabel::from_mode_name(mode_name),
            mode_name: mode_name.to_string(),
            word: word.to_string(),
            remaining_seconds: round_time,
        }
    }
}

/// Progress of an image generation request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenerationStatus {
    #[default]
    Idle,
    /// A request was sent; waiting for `monster_generated` or `generation_error`.
    Pending,
    Succeeded { image_url: String, prompt: String },
    Failed { message: String },
}

impl GenerationStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, GenerationStatus::Pending)
    }
}

/// The broadcaster link as last reported by the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcasterStatus {
    pub link: BroadcasterLink,
    pub message: String,
}

impl Default for BroadcasterStatus {
    fn default() -> Self {
        Self {
            link: BroadcasterLink::Disconnected,
            message: "Disconnected".to_string(),
        }
    }
}

impl BroadcasterStatus {
    /// The username field and connect button are usable only while idle.
    pub fn accepts_connect(&self) -> bool {
        self.link == BroadcasterLink::Disconnected
    }
}

/// A transient banner. Hidden by a one-shot timer after `duration`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub text: String,
    pub duration: Duration,
}

/// Describes what changed in the state after applying an event.
///
/// Frontends can inspect these flags to decide what to re-render. All flags
/// default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateChanged {
    /// Round word, mode or remaining time.
    pub round: bool,
    pub leaderboard: bool,
    pub participants: bool,
    pub parts: bool,
    pub chat: bool,
    pub generation: bool,
    pub auto_play: bool,
    /// The status line.
    pub status: bool,
    pub broadcaster: bool,
    pub connection: bool,
    /// A banner was shown or hidden. When shown, the caller must schedule
    /// [`ClientGameState::hide_announcement`] after its duration.
    pub announcement: bool,
}

impl StateChanged {
    /// Returns `true` if any flag is set.
    pub fn any(self) -> bool {
        self.round
            || self.leaderboard
            || self.participants
            || self.parts
            || self.chat
            || self.generation
            || self.auto_play
            || self.status
            || self.broadcaster
            || self.connection
            || self.announcement
    }
}

/// Everything a live game client shows, derived from server events.
#[derive(Debug, Clone)]
pub struct ClientGameState {
    pub connection: ConnectionState,
    /// Human-readable status line.
    pub status: String,
    pub broadcaster: BroadcasterStatus,
    pub round: RoundState,
    /// Winners of the last finished round.
    pub last_winners: Vec<ScoreEntry>,
    /// Server-ordered ranking; rank is position + 1.
    pub leaderboard: Vec<ScoreEntry>,
    pub participants: Vec<String>,
    pub parts: Vec<String>,
    pub transcript: Transcript,
    pub generation: GenerationStatus,
    /// Last value confirmed by `auto_play_status`.
    ///
    /// Kept across a disconnect, so it may be stale after a reconnect until
    /// the server sends a fresh `auto_play_status`.
    pub auto_play_running: bool,
    pub announcement: Option<Announcement>,
}

impl Default for ClientGameState {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientGameState {
    pub fn new() -> Self {
        Self {
            connection: ConnectionState::Connecting,
            status: "Connecting...".to_string(),
            broadcaster: BroadcasterStatus::default(),
            round: RoundState::default(),
            last_winners: Vec::new(),
            leaderboard: Vec::new(),
            participants: Vec::new(),
            parts: Vec::new(),
            transcript: Transcript::default(),
            generation: GenerationStatus::Idle,
            auto_play_running: false,
            announcement: None,
        }
    }

    /// Whether commands that need a live server link can be issued.
    pub fn is_open(&self) -> bool {
        self.connection == ConnectionState::Open
    }

    /// The generate button is usable only while connected and not waiting
    /// on a previous request.
    pub fn can_generate(&self) -> bool {
        self.is_open() && !self.generation.is_pending()
    }

    /// Replace the status line with local feedback.
    pub fn set_status(&mut self, text: impl Into<String>) -> StateChanged {
        self.status = text.into();
        StateChanged {
            status: true,
            ..StateChanged::default()
        }
    }

    /// Show a banner. The caller schedules the matching hide.
    pub fn announce(&mut self, text: impl Into<String>, duration: Duration) -> StateChanged {
        self.announcement = Some(Announcement {
            text: text.into(),
            duration,
        });
        StateChanged {
            announcement: true,
            ..StateChanged::default()
        }
    }

    /// Hide whatever banner is visible.
    ///
    /// Hides are not matched to the banner that scheduled them: an older
    /// timer firing late clears a newer banner too.
    pub fn hide_announcement(&mut self) -> StateChanged {
        let was_visible = self.announcement.take().is_some();
        StateChanged {
            announcement: was_visible,
            ..StateChanged::default()
        }
    }

    /// Record a transport transition.
    pub fn set_connection(&mut self, connection: ConnectionState) -> StateChanged {
        let mut changed = StateChanged {
            connection: self.connection != connection,
            status: true,
            ..StateChanged::default()
        };
        self.connection = connection;
        self.status = match connection {
            ConnectionState::Connecting => "Connecting...",
            ConnectionState::Open => "Connected to Game Server",
            ConnectionState::Closed => "Disconnected. Trying to reconnect...",
        }
        .to_string();
        match connection {
            // The server reports the broadcaster link itself once connected.
            ConnectionState::Open if changed.connection => {
                self.broadcaster = BroadcasterStatus::default();
                changed.broadcaster = true;
            }
            ConnectionState::Closed => {
                self.broadcaster = BroadcasterStatus {
                    link: BroadcasterLink::Disconnected,
                    message: "Server Connection Lost".to_string(),
                };
                changed.broadcaster = true;
            }
            _ => {}
        }
        changed
    }

    /// Record a transport error. The close that follows drives reconnection.
    pub fn connection_error(&mut self) -> StateChanged {
        self.set_status("Connection Error")
    }

    /// Apply a server message to the state.
    ///
    /// Every collection in the payload replaces the held one wholesale; the
    /// server always sends the complete current value.
    pub fn apply_server_message(&mut self, msg: &ServerMessage) -> StateChanged {
        let mut changed = StateChanged::default();

        match msg {
            ServerMessage::TiktokConnectionStatus { status, message } => {
                self.broadcaster = BroadcasterStatus {
                    link: *status,
                    message: message.clone(),
                };
                changed.broadcaster = true;
            }
            ServerMessage::NewRound {
                mode,
                word,
                round_time,
            } => {
                self.round = RoundState::new(mode, word, *round_time);
                changed.round = true;
                changed.announcement = self
                    .announce(format!("New Round: {mode}"), NEW_ROUND_ANNOUNCEMENT)
                    .announcement;
            }
            ServerMessage::TimerUpdate { time } => {
                self.round.remaining_seconds = *time;
                changed.round = true;
            }
            ServerMessage::RoundOver { winners } => {
                self.last_winners = winners.clone();
                changed.announcement = self
                    .announce(round_over_text(winners), ROUND_OVER_ANNOUNCEMENT)
                    .announcement;
            }
            ServerMessage::LeaderboardUpdate { leaderboard } => {
                self.leaderboard = leaderboard.clone();
                changed.leaderboard = true;
            }
            ServerMessage::TiktokConnected { message } => {
                self.status = message
                    .clone()
                    .unwrap_or_else(|| "Connected to TikTok LIVE".to_string());
                changed.status = true;
                changed.announcement = self
                    .announce("Connected to TikTok!", BROADCASTER_ANNOUNCEMENT)
                    .announcement;
            }
            ServerMessage::StatusUpdate { message } => {
                if let Some(message) = message {
                    self.status = message.clone();
                    changed.status = true;
                }
            }
            ServerMessage::AutoPlayStatus { running } => {
                self.auto_play_running = *running;
                changed.auto_play = true;
            }
            ServerMessage::PartsUpdate { parts } => {
                self.parts = parts.clone();
                changed.parts = true;
            }
            ServerMessage::ParticipantsUpdate { participants } => {
                self.participants = participants.clone();
                changed.participants = true;
            }
            ServerMessage::ChatMessage { user, comment } => {
                self.transcript.append(ChatLine {
                    user: user.clone(),
                    comment: comment.clone(),
                });
                changed.chat = true;
            }
            ServerMessage::MonsterGenerated { image_url, prompt } => {
                self.generation = GenerationStatus::Succeeded {
                    image_url: image_url.clone(),
                    prompt: prompt.clone(),
                };
                self.status = "Monster generated successfully!".to_string();
                changed.generation = true;
                changed.status = true;
            }
            ServerMessage::GenerationError { message } => {
                // Terminal failure; this also unlocks the generate command.
                self.generation = GenerationStatus::Failed {
                    message: message.clone(),
                };
                changed.generation = true;
            }
        }

        changed
    }
}

/// Summary banner text for a finished round.
pub fn round_over_text(winners: &[ScoreEntry]) -> String {
    if winners.is_empty() {
        return "Round Over! No winners this round.".to_string();
    }
    let names: Vec<&str> = winners.iter().map(|w| w.nickname.as_str()).collect();
    format!("Round Over! Winners: {}", names.join(", "))
}
