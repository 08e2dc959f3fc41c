//! End-to-end session tests against a small Axum WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use live_client::client_controller::ClientController;
use live_client::connection::ReconnectPolicy;
use live_client::ws_transport::WsConnector;
use live_core::commands::UserIntent;
use live_core::game_state::ConnectionState;
use live_core::room::{PageLocation, RoomMode, resolve};

const LEADERBOARD: &str =
    r#"{"type":"leaderboard_update","leaderboard":[{"nickname":"ann","score":7},{"nickname":"bo","score":3}]}"#;

#[derive(Clone)]
struct Server {
    connections: Arc<AtomicUsize>,
    /// (room, frame) for every text frame a client sent.
    received: mpsc::UnboundedSender<(String, String)>,
    /// Close the first connection right after greeting it.
    drop_first: bool,
}

async fn ws_room(
    ws: WebSocketUpgrade,
    Path(room): Path<String>,
    State(server): State<Server>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle(socket, room, server))
}

async fn handle(socket: WebSocket, room: String, server: Server) {
    let n = server.connections.fetch_add(1, Ordering::SeqCst) + 1;
    let (mut sink, mut stream) = socket.split();
    if sink.send(Message::Text(LEADERBOARD.into())).await.is_err() {
        return;
    }
    if server.drop_first && n == 1 {
        let _ = sink.send(Message::Close(None)).await;
        return;
    }
    while let Some(Ok(msg)) = stream.next().await {
        if let Message::Text(text) = msg {
            let _ = server.received.send((room.clone(), text.to_string()));
        }
    }
}

async fn spawn_server(drop_first: bool) -> (SocketAddr, Server, mpsc::UnboundedReceiver<(String, String)>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let server = Server {
        connections: Arc::new(AtomicUsize::new(0)),
        received: tx,
        drop_first,
    };
    let app = Router::new()
        .route("/ws/{room}", get(ws_room))
        .with_state(server.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, server, rx)
}

fn endpoint(addr: SocketAddr) -> String {
    let page = PageLocation::parse(&format!("http://{addr}/game/typing-contest")).unwrap();
    let room = resolve(&page.path, RoomMode::Named).unwrap();
    page.endpoint(&room)
}

fn policy() -> ReconnectPolicy {
    ReconnectPolicy {
        delay: Duration::from_millis(50),
    }
}

fn yes(_: &str) -> bool {
    true
}

/// Drive the controller until `done` holds, failing after a few seconds.
async fn drive_until(
    ctrl: &mut ClientController<WsConnector>,
    mut done: impl FnMut(&ClientController<WsConnector>) -> bool,
) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done(ctrl) {
            ctrl.recv().await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn named_room_session_receives_state_and_sends_commands() {
    let (addr, _server, mut received) = spawn_server(false).await;
    let url = endpoint(addr);
    assert_eq!(url, format!("ws://{addr}/ws/typing-contest"));

    let mut ctrl = ClientController::connect_ws(&url, policy());
    drive_until(&mut ctrl, |c| !c.state.leaderboard.is_empty()).await;

    let board = &ctrl.state.leaderboard;
    assert_eq!(board.len(), 2);
    assert_eq!(board[0].nickname, "ann");
    assert_eq!(board[1].score, 3);
    assert_eq!(ctrl.state.status, "Connected to Game Server");

    ctrl.handle_intent(UserIntent::StartRound, &yes).unwrap();
    let (room, frame) = tokio::time::timeout(Duration::from_secs(5), received.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(room, "typing-contest");
    assert_eq!(frame, r#"{"type":"start_round"}"#);
}

#[tokio::test]
async fn session_reconnects_after_server_drops_socket() {
    let (addr, server, _received) = spawn_server(true).await;
    let mut ctrl = ClientController::connect_ws(&endpoint(addr), policy());

    drive_until(&mut ctrl, |c| c.state.connection == ConnectionState::Closed).await;
    assert_eq!(ctrl.state.broadcaster.message, "Server Connection Lost");

    drive_until(&mut ctrl, |c| c.state.is_open()).await;
    assert_eq!(server.connections.load(Ordering::SeqCst), 2);
    assert_eq!(ctrl.connection().attempts(), 2);
}
