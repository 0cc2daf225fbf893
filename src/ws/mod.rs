pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::relay::AppState;
use crate::types::{ConnectionId, Role};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub role: Option<String>,
    /// Checked by the auth middleware before the upgrade
    pub token: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!("WebSocket connection request: role={:?}", params.role);

    ws.on_upgrade(move |socket| handle_socket(socket, params, state))
}

pub fn parse_role(role: Option<&str>) -> Role {
    match role {
        Some("cohost") => Role::Cohost,
        _ => Role::Display,
    }
}

type WsSender = SplitSink<WebSocket, Message>;

async fn send_message(sender: &mut WsSender, msg: &ServerMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to encode server message: {}", e);
            true
        }
    }
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, params: WsQuery, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let role = parse_role(params.role.as_deref());
    let connection_id: ConnectionId = ulid::Ulid::new().to_string();

    if role == Role::Cohost && !state.claim_cohost(&connection_id).await {
        tracing::warn!("Rejecting second co-host connection {}", connection_id);
        let error = ServerMessage::Error {
            code: "COHOST_ACTIVE".to_string(),
            msg: "Another co-host is already connected".to_string(),
        };
        send_message(&mut sender, &error).await;
        let _ = sender.send(Message::Close(None)).await;
        return;
    }

    tracing::info!("WebSocket connected: {} as {:?}", connection_id, role);

    // Subscribe before the welcome so nothing slips between snapshot and stream
    let mut relay_rx = state.subscribe();

    let welcome = state.welcome(role, connection_id.clone()).await;
    if !send_message(&mut sender, &welcome).await {
        tracing::error!("Failed to send welcome message");
        state.release_cohost(&connection_id).await;
        return;
    }

    loop {
        tokio::select! {
            relayed = relay_rx.recv() => {
                match relayed {
                    Ok(relayed) => {
                        if relayed.is_for(&connection_id)
                            && !send_message(&mut sender, &relayed.msg).await
                        {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        // Replaying would be incomplete; resend the whole state
                        tracing::warn!("{} lagged by {} messages, resyncing", connection_id, missed);
                        let snapshot = ServerMessage::Snapshot {
                            snapshot: Box::new(state.snapshot()),
                        };
                        if !send_message(&mut sender, &snapshot).await {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if let Some(response) =
                                    handlers::handle_message(client_msg, &role, &connection_id, &state).await
                                {
                                    if !send_message(&mut sender, &response).await {
                                        tracing::error!("Failed to send response");
                                        break;
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                };
                                send_message(&mut sender, &error).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    if role == Role::Cohost {
        state.release_cohost(&connection_id).await;
    }
    tracing::info!("WebSocket connection closed: {} ({:?})", connection_id, role);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role(Some("cohost")), Role::Cohost);
        assert_eq!(parse_role(Some("display")), Role::Display);
        assert_eq!(parse_role(Some("host")), Role::Display);
        assert_eq!(parse_role(None), Role::Display);
    }
}
