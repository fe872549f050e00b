// Notification trait for user-facing status messages
/// Fire-and-forget sink for human-readable status lines. How long a message
/// stays visible is the presentation layer's business.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str);
}
