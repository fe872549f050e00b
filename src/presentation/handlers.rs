// HTTP request handlers
use crate::application::error::RunError;
use crate::domain::glucose::GlucoseUnit;
use crate::domain::run::{DeleteOutcome, RunConfig, RunState};
use crate::infrastructure::config::RunDefaults;
use crate::infrastructure::event_stream::run_event_stream;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub step: Option<f64>,
    pub interval_seconds: Option<f64>,
    pub unit: Option<GlucoseUnit>,
}

#[derive(Debug, Deserialize)]
pub struct SampleRequest {
    pub value: f64,
    pub unit: Option<GlucoseUnit>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRangeQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RunStatusResponse {
    pub state: RunState,
    pub written: u64,
    pub failed: u64,
}

#[derive(Debug, Serialize)]
pub struct DeleteRangeResponse {
    pub deleted: u64,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Start an auto run. Fields left out of the request are filled from the
/// configured defaults, converted into the requested unit.
pub async fn start_run(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunRequest>,
) -> Response {
    let config = resolve_config(request, &state.run_defaults, Utc::now());

    match state.run_service.start(config) {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(RunStatusResponse::from_service(state.as_ref())),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Cancel the run in flight, if any.
pub async fn stop_run(State(state): State<Arc<AppState>>) -> Response {
    state.run_service.stop();
    Json(RunStatusResponse::from_service(state.as_ref())).into_response()
}

/// Current state plus the in-flight run's write counters.
pub async fn run_status(State(state): State<Arc<AppState>>) -> Response {
    Json(RunStatusResponse::from_service(state.as_ref())).into_response()
}

/// Stream state transitions and notifications (chunked NDJSON).
pub async fn run_events(State(state): State<Arc<AppState>>) -> Response {
    match run_event_stream(state.run_service.subscribe(), state.notifier.subscribe()) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Manual single-sample entry. Timestamp defaults to now, unit to the
/// configured default.
pub async fn write_sample(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SampleRequest>,
) -> Response {
    let unit = request.unit.unwrap_or(state.run_defaults.unit);
    let timestamp = request.timestamp.unwrap_or_else(Utc::now);

    match state
        .run_service
        .write_once(request.value, unit, timestamp)
        .await
    {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) => error_response(e),
    }
}

/// Delete every record in a time range.
pub async fn delete_samples(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeleteRangeQuery>,
) -> Response {
    match state.run_service.delete_range(query.start, query.end).await {
        Ok(DeleteOutcome::Deleted(deleted)) => Json(DeleteRangeResponse {
            deleted,
            message: format!("Deleted {} records", deleted),
        })
        .into_response(),
        Ok(DeleteOutcome::NothingToDelete) => Json(DeleteRangeResponse {
            deleted: 0,
            message: "No records to delete".to_string(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

impl RunStatusResponse {
    fn from_service(state: &AppState) -> Self {
        let status = state.run_service.status();
        Self {
            state: status.state,
            written: status.written,
            failed: status.failed,
        }
    }
}

fn error_response(error: RunError) -> Response {
    let status = match &error {
        RunError::InvalidConfig(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RunError::AlreadyRunning => StatusCode::CONFLICT,
        RunError::StoreWrite(_) | RunError::StoreDelete(_) => StatusCode::BAD_GATEWAY,
        RunError::AuthDenied(_) => StatusCode::FORBIDDEN,
    };

    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

/// Merge a run request with the configured defaults. Default bounds are kept
/// in the defaults' unit, so they are converted (and clamped) when the
/// request asks for the other one. The step is a plain increment and is
/// taken as-is.
fn resolve_config(request: RunRequest, defaults: &RunDefaults, now: DateTime<Utc>) -> RunConfig {
    let unit = request.unit.unwrap_or(defaults.unit);
    let into_unit = |value: f64| unit.clamp(defaults.unit.convert(value, unit));

    let end_time = request.end_time.unwrap_or(now);
    let start_time = request
        .start_time
        .unwrap_or(end_time - Duration::minutes(defaults.window_minutes));

    RunConfig {
        start_time,
        end_time,
        min_value: request
            .min_value
            .unwrap_or_else(|| into_unit(defaults.min_value)),
        max_value: request
            .max_value
            .unwrap_or_else(|| into_unit(defaults.max_value)),
        step: request.step.unwrap_or(defaults.step),
        interval_seconds: request
            .interval_seconds
            .unwrap_or(defaults.interval_seconds),
        unit,
    }
}
