//! Server event broadcasting.
//!
//! Each supervisor owns one broadcaster; presentation layers subscribe to
//! it instead of polling state.

use tokio::sync::broadcast;
use tracing::debug;
use whisperlaunch_core::ServerEvent;

/// Broadcast channel capacity for server events
const CHANNEL_CAPACITY: usize = 64;

/// Broadcaster for server lifecycle events
#[derive(Debug)]
pub struct ServerEventBroadcaster {
    sender: broadcast::Sender<ServerEvent>,
}

impl ServerEventBroadcaster {
    /// Create a new broadcaster
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Broadcast a server event to all subscribers
    pub fn broadcast(&self, event: ServerEvent) {
        debug!(?event, "broadcasting server event");
        // No subscribers is fine; events are not replayed
        let _ = self.sender.send(event);
    }

    /// Subscribe to server events
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }
}

impl Default for ServerEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_events_in_order() {
        let broadcaster = ServerEventBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.broadcast(ServerEvent::stopping(Some(7)));
        broadcaster.broadcast(ServerEvent::exited(Some(0)));

        assert!(matches!(rx.recv().await.unwrap(), ServerEvent::Stopping { pid: Some(7), .. }));
        assert!(matches!(rx.recv().await.unwrap(), ServerEvent::Exited { code: Some(0), .. }));
    }

    #[test]
    fn broadcasting_without_subscribers_is_silent() {
        let broadcaster = ServerEventBroadcaster::default();
        broadcaster.broadcast(ServerEvent::exited(None));

        // Late subscribers only see what comes after them
        let mut rx = broadcaster.subscribe();
        assert!(rx.try_recv().is_err());
    }
}
