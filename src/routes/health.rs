use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;

/// GET /health - Report synchronizer and credential status
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snapshot = state.synchronizer.snapshot();

    let refreshed_at = snapshot
        .refreshed_at
        .and_then(|t| t.format(&Rfc3339).ok());

    let status = if refreshed_at.is_some() { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "checks": {
            "synchronizer_running": state.synchronizer.is_running(),
            "flood_points": snapshot.points.len(),
            "last_refreshed_at": refreshed_at,
            "directions_credential": state.mapbox.has_credential(),
        }
    }))
}
