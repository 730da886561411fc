use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use crate::service::QueryService;

/// Handler for GET /health
pub async fn health_handler(State(service): State<Arc<QueryService>>) -> Json<Value> {
    debug!("Health check requested");
    let coordinator = service.orchestrator().coordinator();
    let last_refresh = coordinator.last_report().map(|report| {
        json!({
            "startedAt": report.started_at,
            "finishedAt": report.finished_at,
            "persisted": report.persisted_any(),
            "failedSources": report.failed_sources,
        })
    });

    Json(json!({
        "status": "healthy",
        "refreshInFlight": coordinator.is_in_flight(),
        "refreshGeneration": coordinator.generation(),
        "lastRefresh": last_refresh,
    }))
}
