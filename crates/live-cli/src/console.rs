//! Line-oriented console frontend.
//!
//! Reads commands from stdin, turns them into [`UserIntent`]s and prints the
//! parts of the state that changed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use live_client::client_controller::Frontend;
use live_core::commands::{CommandError, Confirm, UserIntent};
use live_core::game_state::{ClientGameState, GenerationStatus, StateChanged};
use live_core::protocol::GameMode;

pub const HELP: &str = "\
Commands:
  start                 start a round
  mode <name>           classic | sentence | emoji | hard | speed_up
  auto [seconds]        toggle automatic rounds
  reset                 reset the leaderboard
  connect @<user>       attach a broadcaster's live chat
  generate <api>        generate a monster from the collected parts
  help                  show this text
  quit                  leave";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Intent(UserIntent),
    Help,
    Quit,
}

/// Parse one console line. `Err` carries a message for the user.
pub fn parse_line(line: &str) -> Result<Option<Input>, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let intent = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "help" | "?" => return Ok(Some(Input::Help)),
        "quit" | "exit" => return Ok(Some(Input::Quit)),
        "start" => UserIntent::StartRound,
        "mode" => match GameMode::parse(rest) {
            Some(mode) => UserIntent::SetGameMode(mode),
            None => return Err(format!("Unknown game mode `{rest}`")),
        },
        "auto" => UserIntent::ToggleAutoPlay {
            delay_input: rest.to_string(),
        },
        "reset" => UserIntent::ResetLeaderboard,
        "connect" => UserIntent::ConnectBroadcaster {
            username: rest.to_string(),
        },
        "generate" => {
            if rest.is_empty() {
                return Err("Usage: generate <api>".to_string());
            }
            UserIntent::Generate {
                api: rest.to_string(),
            }
        }
        other => return Err(format!("Unknown command `{other}`; type `help`")),
    };
    Ok(Some(Input::Intent(intent)))
}

/// Read stdin until EOF or `quit`, forwarding intents to the session.
///
/// Destructive intents are confirmed here, on the same stdin, and the answer
/// is left in `confirmed` for [`Console::confirm`] to pick up.
pub fn spawn_stdin_reader(tx: mpsc::UnboundedSender<UserIntent>, confirmed: Arc<AtomicBool>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let intent = match parse_line(&line) {
                Ok(Some(Input::Intent(intent))) => intent,
                Ok(Some(Input::Help)) => {
                    println!("{HELP}");
                    continue;
                }
                Ok(Some(Input::Quit)) => break,
                Ok(None) => continue,
                Err(msg) => {
                    println!("{msg}");
                    continue;
                }
            };

            if intent == UserIntent::ResetLeaderboard {
                println!("Are you sure you want to reset the leaderboard? [y/N]");
                let answer = lines.next_line().await.ok().flatten().unwrap_or_default();
                confirmed.store(is_yes(&answer), Ordering::SeqCst);
            }
            if tx.send(intent).is_err() {
                break;
            }
        }
        // Dropping `tx` ends the session loop.
    });
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Prints state changes to stdout.
#[derive(Default)]
pub struct Console {
    confirmed: Arc<AtomicBool>,
}

impl Console {
    /// Shared flag the stdin reader sets after asking for confirmation.
    pub fn confirmation(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.confirmed)
    }
}

impl Confirm for Console {
    fn confirm(&self, _question: &str) -> bool {
        self.confirmed.swap(false, Ordering::SeqCst)
    }
}

impl Frontend for Console {
    fn render(&mut self, state: &ClientGameState, changed: StateChanged) {
        for line in render_lines(state, changed) {
            println!("{line}");
        }
    }

    fn rejected(&mut self, error: &CommandError) {
        println!("! {error}");
    }
}

/// Lines to print for the changed slices of `state`.
pub fn render_lines(state: &ClientGameState, changed: StateChanged) -> Vec<String> {
    let mut out = Vec::new();

    if changed.status || changed.connection {
        out.push(format!("[status] {}", state.status));
    }
    if changed.broadcaster {
        out.push(format!(
            "[tiktok] {}: {}",
            state.broadcaster.link, state.broadcaster.message
        ));
    }
    if changed.announcement
        && let Some(banner) = &state.announcement
    {
        out.push(format!("*** {} ***", banner.text));
    }
    if changed.round {
        let round = &state.round;
        out.push(format!(
            "[{}] {} {}  ({}s)",
            round.mode_name,
            round.mode.prompt(),
            round.word,
            round.remaining_seconds
        ));
    }
    if changed.leaderboard {
        out.push("[leaderboard]".to_string());
        for (i, entry) in state.leaderboard.iter().enumerate() {
            out.push(format!("  {}. {} - {}", i + 1, entry.nickname, entry.score));
        }
    }
    if changed.participants {
        out.push(format!("[participants] {}", state.participants.join(", ")));
    }
    if changed.parts {
        out.push(format!("[parts] {}", state.parts.join(", ")));
    }
    if changed.chat
        && let Some(line) = state.transcript.latest()
    {
        out.push(format!("<{}> {}", line.user, line.comment));
    }
    if changed.auto_play {
        let label = if state.auto_play_running { "on" } else { "off" };
        out.push(format!("[auto-play] {label}"));
    }
    if changed.generation {
        match &state.generation {
            GenerationStatus::Idle => {}
            GenerationStatus::Pending => out.push("[monster] generating...".to_string()),
            GenerationStatus::Succeeded { image_url, prompt } => {
                out.push(format!("[monster] {image_url}"));
                out.push(format!("[prompt] {prompt}"));
            }
            GenerationStatus::Failed { message } => out.push(format!("[monster] {message}")),
        }
    }

    out
}
