//! Command dispatch between the co-host and the displays.
//!
//! The co-host's [`Leader`] applies a command to its own replica and then
//! publishes it; every display runs one [`Follower`] that replays the same
//! command on its replica. Nothing but commands travel in the steady state.

mod follower;
mod leader;
mod publisher;
mod replica;

pub use follower::Follower;
pub use leader::Leader;
pub use publisher::{ChannelPublisher, Publisher};
pub use replica::Replica;

use crate::protocol::Command;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("realtime channel not ready")]
    ChannelNotReady,
    #[error("failed to encode command: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode command: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Wire form of a command: `{"action": ..., "data": ...}`
pub fn encode_command(cmd: &Command) -> Result<String, SyncError> {
    serde_json::to_string(cmd).map_err(SyncError::Encode)
}

pub fn decode_command(raw: &str) -> Result<Command, SyncError> {
    serde_json::from_str(raw).map_err(SyncError::Decode)
}
