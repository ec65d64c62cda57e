//! WebSocket endpoint: one session per connection.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::http::AppState;
use crate::session::Session;

/// Outbound channel depth per connection.
const OUTBOUND_CAPACITY: usize = 256;

/// Upgrade handler for `/ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Drive one connection: a writer task drains the session's outbound
/// channel while the read loop feeds frames to the state machine.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut source) = socket.split();
    let (tx, mut rx) = mpsc::channel(OUTBOUND_CAPACITY);

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&message) else {
                continue;
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let mut session = Session::new(state.engine.clone(), state.auth.clone(), tx);

    while let Some(Ok(message)) = source.next().await {
        match message {
            Message::Text(text) => {
                if !session.handle_text(&text).await {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Dropping the session releases any attachment and closes the last
    // outbound sender, so the writer drains pending messages (a final
    // authentication error included) before the socket is dropped.
    drop(session);
    let _ = writer.await;
}
