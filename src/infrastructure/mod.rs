// Infrastructure layer - External dependencies and adapters
pub mod broadcast_notifier;
pub mod config;
pub mod event_stream;
pub mod health_store;
