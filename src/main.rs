// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{routing::{get, post}, Router};
use tower_http::trace::TraceLayer;

use crate::application::run_service::RunService;
use crate::infrastructure::broadcast_notifier::BroadcastNotifier;
use crate::infrastructure::config::{load_run_defaults, load_store_config};
use crate::infrastructure::health_store::HealthRecordStore;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    delete_samples, health_check, run_events, run_status, start_run, stop_run, write_sample,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let store_config = load_store_config()?;
    let defaults = load_run_defaults()?;

    // Create store adapter (infrastructure layer)
    let store = Arc::new(HealthRecordStore::new(
        store_config.store.host,
        store_config.store.token,
        store_config.store.record_type,
    ));
    let notifier = Arc::new(BroadcastNotifier::new());

    // Create service (application layer)
    let run_service = RunService::new(store, notifier.clone());

    // Authorization is requested once up front. A denial is reported and the
    // service stays up; writes then fail per sample until the store grants
    // access.
    if let Err(e) = run_service.request_access().await {
        tracing::warn!("{}", e);
    }

    // Create application state
    let state = Arc::new(AppState {
        run_service,
        notifier,
        run_defaults: defaults.defaults,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/runs", post(start_run))
        .route("/runs/current", get(run_status).delete(stop_run))
        .route("/runs/current/events", get(run_events))
        .route("/samples", post(write_sample).delete(delete_samples))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();
    println!("Starting glucose-simulator service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
