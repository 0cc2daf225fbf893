//! Shared state of the websocket relay.
//!
//! The relay forwards the co-host's commands to every other connection. It
//! also replays them on a shadow follower so it can hand a full snapshot to
//! displays that connect late or lose messages.

use crate::protocol::{Command, ServerMessage};
use crate::state::GameSnapshot;
use crate::sync::{Follower, Replica};
use crate::types::{ConnectionId, Role};
use tokio::sync::{broadcast, RwLock};

pub const PROTOCOL_VERSION: &str = "1.0";

const RELAY_CAPACITY: usize = 256;

/// A message on the relay bus, tagged with the connection it came from
#[derive(Debug, Clone)]
pub struct Relayed {
    /// None for messages the relay itself originates
    pub origin: Option<ConnectionId>,
    pub msg: ServerMessage,
}

impl Relayed {
    /// Whether `connection` should receive this message
    pub fn is_for(&self, connection: &ConnectionId) -> bool {
        self.origin.as_ref() != Some(connection)
    }
}

pub struct AppState {
    shadow: Follower,
    relay: broadcast::Sender<Relayed>,
    cohost: RwLock<Option<ConnectionId>>,
}

impl AppState {
    pub fn new(shadow: Replica) -> Self {
        let (relay, _rx) = broadcast::channel(RELAY_CAPACITY);
        Self {
            shadow: Follower::new(shadow),
            relay,
            cohost: RwLock::new(None),
        }
    }

    pub fn shadow(&self) -> &Replica {
        self.shadow.replica()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.shadow.replica().snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Relayed> {
        self.relay.subscribe()
    }

    /// Take the co-host slot. Only one co-host may be connected at a time.
    pub async fn claim_cohost(&self, connection: &ConnectionId) -> bool {
        let mut cohost = self.cohost.write().await;
        if cohost.as_ref().is_some_and(|current| current != connection) {
            return false;
        }
        *cohost = Some(connection.clone());
        drop(cohost);

        tracing::info!("Co-host connected: {}", connection);
        self.send(None, ServerMessage::CohostStatus { connected: true });
        true
    }

    pub async fn release_cohost(&self, connection: &ConnectionId) {
        let mut cohost = self.cohost.write().await;
        if cohost.as_ref() == Some(connection) {
            *cohost = None;
            drop(cohost);
            tracing::info!("Co-host disconnected: {}", connection);
            self.send(None, ServerMessage::CohostStatus { connected: false });
        }
    }

    pub async fn cohost_connected(&self) -> bool {
        self.cohost.read().await.is_some()
    }

    /// Replay on the shadow, then forward to everyone but the sender
    pub async fn relay_command(&self, origin: &ConnectionId, cmd: Command) {
        self.shadow.handle_command(cmd.clone()).await;
        self.send(
            Some(origin.clone()),
            ServerMessage::StateUpdate { payload: cmd },
        );
    }

    pub async fn welcome(&self, role: Role, connection_id: ConnectionId) -> ServerMessage {
        ServerMessage::Welcome {
            protocol: PROTOCOL_VERSION.to_string(),
            role,
            connection_id,
            snapshot: Box::new(self.snapshot()),
            cohost_connected: self.cohost_connected().await,
            server_now: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn send(&self, origin: Option<ConnectionId>, msg: ServerMessage) {
        // No receivers connected is fine
        let _ = self.relay.send(Relayed { origin, msg });
    }
}
