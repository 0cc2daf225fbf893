use super::{encode_command, SyncError};
use crate::protocol::Command;
use tokio::sync::broadcast;

/// Outbound side of the realtime channel
pub trait Publisher: Send + Sync {
    fn publish(&self, cmd: &Command) -> Result<(), SyncError>;
}

/// Publishes encoded commands on an in-process broadcast channel
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    tx: broadcast::Sender<String>,
}

impl ChannelPublisher {
    pub fn new(tx: broadcast::Sender<String>) -> Self {
        Self { tx }
    }

    /// Publisher plus its channel; subscribe followers via the sender
    pub fn channel(capacity: usize) -> (Self, broadcast::Sender<String>) {
        let (tx, _rx) = broadcast::channel(capacity);
        (Self::new(tx.clone()), tx)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Publisher for ChannelPublisher {
    fn publish(&self, cmd: &Command) -> Result<(), SyncError> {
        let raw = encode_command(cmd)?;
        self.tx
            .send(raw)
            .map(|_| ())
            .map_err(|_| SyncError::ChannelNotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_is_not_ready() {
        let (publisher, _tx) = ChannelPublisher::channel(8);
        let err = publisher.publish(&Command::StartGame).unwrap_err();
        assert!(matches!(err, SyncError::ChannelNotReady));
    }

    #[tokio::test]
    async fn test_publish_delivers_encoded_command() {
        let (publisher, _tx) = ChannelPublisher::channel(8);
        let mut rx = publisher.subscribe();

        publisher.publish(&Command::GoToRound { index: 4 }).unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            r#"{"action":"goToRound","data":{"index":4}}"#
        );
    }
}
