//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use event_store::EventStore;
use projections::ReadModelStore;
use serde::Serialize;

use super::todo_lists::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Number of todo lists currently projected.
    pub projected_lists: usize,
}

/// GET /health
pub async fn check<S: EventStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        projected_lists: state.projector.store().count().await,
    })
}
