// Notification sink fanned out over a broadcast channel
use crate::application::notification::NotificationSink;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 32;

/// Mirrors every status message to the log and to any connected event-stream
/// subscribers. Messages sent with nobody listening are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<String>,
}

impl BroadcastNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for BroadcastNotifier {
    fn notify(&self, message: &str) {
        tracing::info!("{}", message);
        let _ = self.tx.send(message.to_string());
    }
}
