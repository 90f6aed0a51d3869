//! Realtime push channel.
//!
//! Clients connect to `GET /ws` and receive every [`ChangeEvent`] as a JSON
//! text frame. Messages sent by clients are ignored.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};

use super::{hub::ChangeEvent, AppState};

pub async fn handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    // Subscribe before the upgrade completes so no event published after the
    // handshake is missed.
    let events = state.hub.subscribe();
    ws.on_upgrade(move |socket| forward_events(socket, events))
}

async fn forward_events(socket: WebSocket, mut events: broadcast::Receiver<ChangeEvent>) {
    let (mut sender, mut receiver) = socket.split();
    tracing::debug!("Subscriber connected");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::warn!("Failed to encode {}: {}", event.event, e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Subscriber lagged, skipped {} event(s)", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!("Subscriber disconnected");
}
