use crate::error::{AppError, Result};
use crate::models::{FloodPoint, FloodStatus, MediaSource};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;

/// Query parameters for the point listing
#[derive(Debug, Deserialize)]
pub struct FloodPointQueryParams {
    /// Only return points with this status
    #[serde(default)]
    pub status: Option<FloodStatus>,
}

#[derive(Debug, Serialize)]
pub struct FloodPointsResponse {
    pub points: Vec<FloodPoint>,
    pub total: usize,
    pub flooded: usize,
    #[serde(with = "time::serde::rfc3339::option")]
    pub refreshed_at: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct FloodPointDetail {
    #[serde(flatten)]
    pub point: FloodPoint,
    pub media: MediaSource,
}

/// GET /flood-points?status=flooded
/// Latest synchronized point set
pub async fn list_flood_points(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FloodPointQueryParams>,
) -> Json<FloodPointsResponse> {
    let snapshot = state.synchronizer.snapshot();

    let flooded = snapshot.points.iter().filter(|p| p.is_flooded()).count();
    let points: Vec<FloodPoint> = snapshot
        .points
        .iter()
        .filter(|p| params.status.map_or(true, |s| p.status == s))
        .cloned()
        .collect();

    Json(FloodPointsResponse {
        total: snapshot.points.len(),
        flooded,
        points,
        refreshed_at: snapshot.refreshed_at,
    })
}

/// GET /flood-points/{id}
/// One point plus how its camera feed should be presented
pub async fn get_flood_point(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FloodPointDetail>> {
    let point = state
        .synchronizer
        .point(&id)
        .ok_or_else(|| AppError::NotFound(format!("Flood point {} not found", id)))?;

    let media = MediaSource::for_point(&point);
    Ok(Json(FloodPointDetail { point, media }))
}
