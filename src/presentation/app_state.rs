// Application state for HTTP handlers
use crate::application::run_service::RunService;
use crate::infrastructure::broadcast_notifier::BroadcastNotifier;
use crate::infrastructure::config::RunDefaults;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub run_service: RunService,
    pub notifier: Arc<BroadcastNotifier>,
    pub run_defaults: RunDefaults,
}
