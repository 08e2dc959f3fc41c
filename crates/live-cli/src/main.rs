use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use live_client::client_controller::ClientController;
use live_client::connection::{RECONNECT_DELAY_MS, ReconnectPolicy};
use live_core::room::{HUB_ROOM, PageLocation, RoomAddress, RoomMode, resolve};

mod console;

/// Which room the page talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RoomArg {
    /// The server's implicit room (`/ws`).
    Default,
    /// The room named by the page path, e.g. `/game/monster_fusion`.
    Named,
    /// The broadcaster hub.
    Hub,
}

#[derive(Parser)]
#[command(name = "live-session")]
#[command(about = "Join a live-stream chat game room from the console", long_about = None)]
struct Cli {
    /// URL of the game page, e.g. http://127.0.0.1:8000/game/typing
    #[arg(short, long, default_value = "http://127.0.0.1:8000/")]
    url: String,

    /// How the room is chosen
    #[arg(short = 'm', long, value_enum, default_value_t = RoomArg::Default)]
    room_mode: RoomArg,

    /// Delay before each reconnect attempt, in milliseconds
    #[arg(long, default_value_t = RECONNECT_DELAY_MS)]
    reconnect_ms: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let page = PageLocation::parse(&cli.url)?;
    let room = match cli.room_mode {
        RoomArg::Default => resolve(&page.path, RoomMode::Default)?,
        RoomArg::Named => resolve(&page.path, RoomMode::Named)?,
        RoomArg::Hub => RoomAddress::named(HUB_ROOM),
    };
    let endpoint = page.endpoint(&room);
    tracing::debug!(%room, %endpoint, "Resolved session endpoint");
    println!("Joining {room} at {endpoint}");
    println!("{}", console::HELP);

    let policy = ReconnectPolicy {
        delay: Duration::from_millis(cli.reconnect_ms),
    };
    let mut ctrl = ClientController::connect_ws(&endpoint, policy);

    let (intent_tx, intent_rx) = mpsc::unbounded_channel();
    let mut frontend = console::Console::default();
    console::spawn_stdin_reader(intent_tx, frontend.confirmation());

    ctrl.run(intent_rx, &mut frontend).await;
    Ok(())
}
