use crate::error::{AppError, Result};
use crate::models::{Coordinates, RouteResult, SelectionRole, VehicleProfile};
use crate::services::PlannerView;
use crate::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub role: SelectionRole,
}

#[derive(Debug, Deserialize)]
pub struct OptionsRequest {
    #[serde(default)]
    pub avoid_flood: Option<bool>,
    #[serde(default)]
    pub vehicle: Option<VehicleProfile>,
}

/// GET /planner
pub async fn get_planner(State(state): State<Arc<AppState>>) -> Json<PlannerView> {
    Json(state.planner.lock().await.view())
}

/// POST /planner/select
/// Arm the next click to set the start or end point
pub async fn request_selection(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectRequest>,
) -> Result<Json<PlannerView>> {
    let mut planner = state.planner.lock().await;
    planner.request_selection(request.role)?;
    Ok(Json(planner.view()))
}

/// POST /planner/click
pub async fn map_click(
    State(state): State<Arc<AppState>>,
    Json(at): Json<Coordinates>,
) -> Result<Json<PlannerView>> {
    at.validate().map_err(AppError::InvalidRequest)?;

    let mut planner = state.planner.lock().await;
    if planner.map_click(at).is_none() {
        tracing::debug!("Map click ignored: no selection pending");
    }
    Ok(Json(planner.view()))
}

/// POST /planner/cancel
pub async fn cancel_selection(State(state): State<Arc<AppState>>) -> Json<PlannerView> {
    let mut planner = state.planner.lock().await;
    planner.cancel_selection();
    Json(planner.view())
}

/// POST /planner/reset
pub async fn restart_selection(State(state): State<Arc<AppState>>) -> Result<Json<PlannerView>> {
    let mut planner = state.planner.lock().await;
    planner.restart_selection()?;
    Ok(Json(planner.view()))
}

/// PUT /planner/options
pub async fn update_options(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OptionsRequest>,
) -> Result<Json<PlannerView>> {
    let mut planner = state.planner.lock().await;
    if let Some(avoid_flood) = request.avoid_flood {
        planner.set_avoid_flood(avoid_flood)?;
    }
    if let Some(vehicle) = request.vehicle {
        planner.set_vehicle_profile(vehicle)?;
    }
    Ok(Json(planner.view()))
}

/// POST /planner/query
/// Run the planner's query. The lock is released while the directions
/// request is in flight; a second query meanwhile gets 409.
pub async fn run_query(State(state): State<Arc<AppState>>) -> Result<Json<PlannerView>> {
    let query = state.planner.lock().await.begin_query()?;

    // Spawned so the planner always leaves `Querying`, even if this
    // handler is dropped mid-request.
    let task_state = state.clone();
    let view = tokio::spawn(async move {
        let result = match task_state.synchronizer.snapshot().exclusions_for(&query) {
            Ok(exclusions) => task_state.mapbox.request_route(&query, &exclusions).await,
            Err(failure) => RouteResult::Failure(failure),
        };

        let mut planner = task_state.planner.lock().await;
        planner.complete_query(result)?;
        Ok::<_, AppError>(planner.view())
    })
    .await
    .map_err(|e| AppError::Internal(format!("Route query task failed: {}", e)))??;

    Ok(Json(view))
}
