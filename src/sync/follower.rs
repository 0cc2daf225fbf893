use super::{decode_command, Replica, SyncError};
use crate::protocol::{Command, ServerMessage};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// A display: replays whatever the leader broadcasts.
///
/// Exactly one follower should exist per display process, otherwise every
/// command would be applied more than once.
#[derive(Clone)]
pub struct Follower {
    replica: Replica,
}

impl Follower {
    pub fn new(replica: Replica) -> Self {
        Self { replica }
    }

    pub fn replica(&self) -> &Replica {
        &self.replica
    }

    pub async fn handle_command(&self, cmd: Command) {
        tracing::debug!("Replaying {}", cmd.action());
        self.replica
            .mutate(|store| {
                // A display that joined mid-round may not have loaded the
                // questions yet; replaying blind would be a silent no-op
                if cmd == Command::NextQuestion && store.snapshot().active_questions.is_empty() {
                    store.load_questions_for_current_round();
                }
                store.replay(&cmd);
            })
            .await;
    }

    /// Decode and replay one raw channel message
    pub async fn handle_message(&self, raw: &str) -> Result<(), SyncError> {
        let cmd = decode_command(raw)?;
        self.handle_command(cmd).await;
        Ok(())
    }

    /// React to a relay message; returns false for messages that carry no state
    pub async fn handle_server_message(&self, msg: ServerMessage) -> bool {
        match msg {
            ServerMessage::StateUpdate { payload } => {
                self.handle_command(payload).await;
                true
            }
            ServerMessage::Welcome { snapshot, .. } | ServerMessage::Snapshot { snapshot } => {
                self.replica.restore(*snapshot).await;
                true
            }
            ServerMessage::CohostStatus { .. } | ServerMessage::Error { .. } => false,
        }
    }

    /// Replay everything arriving on `rx` until the channel closes
    pub fn spawn(self, mut rx: broadcast::Receiver<String>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(raw) => {
                        if let Err(e) = self.handle_message(&raw).await {
                            tracing::warn!("Dropping channel message: {}", e);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!("Follower lagged, {} commands missed", missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::info!("Follower channel closed");
        })
    }
}
