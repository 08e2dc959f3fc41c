use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of a ranking, as sent in `leaderboard_update` and `round_over`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreEntry {
    pub nickname: String,
    pub score: i64,
}

/// Status of the live-stream broadcaster link, as reported by the hub.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BroadcasterLink {
    #[serde(alias = "Connecting")]
    Connecting,
    #[serde(alias = "Connected")]
    Connected,
    #[serde(alias = "Disconnected")]
    Disconnected,
}

impl BroadcasterLink {
    pub fn label(self) -> &'static str {
        match self {
            BroadcasterLink::Connecting => "connecting",
            BroadcasterLink::Connected => "connected",
            BroadcasterLink::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for BroadcasterLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Word-selection mode of the typing contest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Classic,
    Sentence,
    Emoji,
    Hard,
    SpeedUp,
}

impl GameMode {
    pub const ALL: [GameMode; 5] = [
        GameMode::Classic,
        GameMode::Sentence,
        GameMode::Emoji,
        GameMode::Hard,
        GameMode::SpeedUp,
    ];

    /// Wire name, also accepted by [`GameMode::parse`].
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Sentence => "sentence",
            GameMode::Emoji => "emoji",
            GameMode::Hard => "hard",
            GameMode::SpeedUp => "speed_up",
        }
    }

    pub fn parse(s: &str) -> Option<GameMode> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Attach the server to a broadcaster's live chat
    ConnectTiktok {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        username: Option<String>,
    },

    /// Change how the next round's word is chosen
    SetGameMode { mode: GameMode },

    /// Start one round now
    StartRound,

    /// Let the server schedule rounds automatically, `delay` seconds apart
    StartAutoPlay { delay: u32 },

    /// Stop automatic rounds
    StopAutoPlay,

    /// Clear all scores
    ResetLeaderboard,

    /// Fuse the collected parts into an image using the named backend
    GenerateMonster { api: String },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Broadcaster link changed state
    TiktokConnectionStatus {
        status: BroadcasterLink,
        #[serde(default)]
        message: String,
    },

    /// A round started
    NewRound {
        mode: String,
        word: String,
        round_time: i64,
    },

    /// Seconds left in the current round
    TimerUpdate { time: i64 },

    /// The current round ended
    RoundOver {
        #[serde(default)]
        winners: Vec<ScoreEntry>,
    },

    /// Full ranking, best first
    LeaderboardUpdate { leaderboard: Vec<ScoreEntry> },

    /// The server attached to the broadcaster's chat
    TiktokConnected {
        #[serde(default)]
        message: Option<String>,
    },

    /// Free-form progress text
    StatusUpdate {
        #[serde(default)]
        message: Option<String>,
    },

    /// Whether automatic rounds are running
    AutoPlayStatus { running: bool },

    /// Monster parts collected from chat so far
    PartsUpdate { parts: Vec<String> },

    /// Viewers taking part in the current session
    ParticipantsUpdate { participants: Vec<String> },

    /// A chat comment relayed from the stream
    ChatMessage { user: String, comment: String },

    /// Image generation finished
    MonsterGenerated { image_url: String, prompt: String },

    /// Image generation failed
    GenerationError { message: String },
}

impl ServerMessage {
    /// Every `type` tag this client understands.
    pub const TAGS: [&'static str; 13] = [
        "tiktok_connection_status",
        "new_round",
        "timer_update",
        "round_over",
        "leaderboard_update",
        "tiktok_connected",
        "status_update",
        "auto_play_status",
        "parts_update",
        "participants_update",
        "chat_message",
        "monster_generated",
        "generation_error",
    ];

    pub fn is_known_tag(tag: &str) -> bool {
        Self::TAGS.contains(&tag)
    }

    /// The wire `type` tag of this message.
    pub fn tag(&self) -> &'static str {
        match self {
            ServerMessage::TiktokConnectionStatus { .. } => "tiktok_connection_status",
            ServerMessage::NewRound { .. } => "new_round",
            ServerMessage::TimerUpdate { .. } => "timer_update",
            ServerMessage::RoundOver { .. } => "round_over",
            ServerMessage::LeaderboardUpdate { .. } => "leaderboard_update",
            ServerMessage::TiktokConnected { .. } => "tiktok_connected",
            ServerMessage::StatusUpdate { .. } => "status_update",
            ServerMessage::AutoPlayStatus { .. } => "auto_play_status",
            ServerMessage::PartsUpdate { .. } => "parts_update",
            ServerMessage::ParticipantsUpdate { .. } => "participants_update",
            ServerMessage::ChatMessage { .. } => "chat_message",
            ServerMessage::MonsterGenerated { .. } => "monster_generated",
            ServerMessage::GenerationError { .. } => "generation_error",
        }
    }
}
