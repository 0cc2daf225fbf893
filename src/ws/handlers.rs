//! WebSocket message dispatch
//!
//! Authorization is checked here before anything touches the relay.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::relay::AppState;
use crate::types::{ConnectionId, Role};
use std::sync::Arc;

/// Macro to check co-host authorization and return early if unauthorized
macro_rules! check_cohost {
    ($role:expr, $action:expr) => {
        if *$role != Role::Cohost {
            return Some(ServerMessage::Error {
                code: "UNAUTHORIZED".to_string(),
                msg: format!("Only the co-host can {}", $action),
            });
        }
    };
}

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    role: &Role,
    connection_id: &ConnectionId,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::StateUpdate { payload } => {
            check_cohost!(role, "broadcast commands");
            tracing::info!("Relaying {} from {}", payload.action(), connection_id);
            state.relay_command(connection_id, payload).await;
            None
        }

        ClientMessage::RequestSync => {
            tracing::debug!("Sync requested by {}", connection_id);
            Some(ServerMessage::Snapshot {
                snapshot: Box::new(state.snapshot()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Command;
    use crate::state::test_support::store;
    use crate::sync::Replica;

    fn app_state() -> Arc<AppState> {
        Arc::new(AppState::new(Replica::new(store())))
    }

    #[tokio::test]
    async fn test_display_cannot_broadcast() {
        let state = app_state();
        let response = handle_message(
            ClientMessage::StateUpdate {
                payload: Command::StartGame,
            },
            &Role::Display,
            &"display-1".to_string(),
            &state,
        )
        .await;

        match response {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "UNAUTHORIZED"),
            other => panic!("Expected UNAUTHORIZED, got {:?}", other),
        }
        assert_eq!(state.snapshot().phase, crate::types::Phase::Welcome);
    }

    #[tokio::test]
    async fn test_cohost_update_has_no_reply() {
        let state = app_state();
        let response = handle_message(
            ClientMessage::StateUpdate {
                payload: Command::StartGame,
            },
            &Role::Cohost,
            &"cohost".to_string(),
            &state,
        )
        .await;

        assert!(response.is_none());
        assert_eq!(state.snapshot().phase, crate::types::Phase::RoundTransition);
    }

    #[tokio::test]
    async fn test_request_sync_returns_snapshot() {
        let state = app_state();
        state
            .relay_command(&"cohost".to_string(), Command::GoToRound { index: 7 })
            .await;

        let response =
            handle_message(ClientMessage::RequestSync, &Role::Display, &"d".to_string(), &state).await;
        match response {
            Some(ServerMessage::Snapshot { snapshot }) => {
                assert_eq!(snapshot.current_round_index, 7)
            }
            other => panic!("Expected Snapshot, got {:?}", other),
        }
    }
}
