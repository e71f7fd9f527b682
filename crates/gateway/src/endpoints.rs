//! Event-ingest endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use tracing::debug;

use aegis_common::AppResult;
use aegis_core::InboundEvent;

use crate::state::AppState;

/// Create the gateway router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/events", post(ingest_event))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the process is serving.
    pub status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Event acknowledgement.
#[derive(Debug, Serialize)]
pub struct EventAck {
    /// Whether the event was accepted for handling.
    pub accepted: bool,
}

/// Accept one inbound platform event and route it through triage.
async fn ingest_event(
    State(state): State<AppState>,
    Json(event): Json<InboundEvent>,
) -> AppResult<Json<EventAck>> {
    debug!(?event, "Inbound platform event");
    state.coordinator.on_event(event).await?;
    Ok(Json(EventAck { accepted: true }))
}
