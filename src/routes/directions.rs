use crate::error::{AppError, Result};
use crate::models::{
    Coordinates, RouteGeometry, RouteQuery, RouteResult, VehicleProfile,
};
use crate::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct DirectionsRequest {
    pub start: Option<Coordinates>,
    pub end: Option<Coordinates>,
    #[serde(default = "default_avoid_flood")]
    pub avoid_flood: bool,
    #[serde(default)]
    pub vehicle: VehicleProfile,
}

fn default_avoid_flood() -> bool {
    true
}

impl DirectionsRequest {
    pub fn validate(&self) -> std::result::Result<(), String> {
        for c in self.start.iter().chain(self.end.iter()) {
            c.validate()?;
        }
        Ok(())
    }

    pub fn to_query(&self) -> RouteQuery {
        RouteQuery {
            avoid_flood: self.avoid_flood,
            vehicle: self.vehicle,
            ..RouteQuery::new(self.start, self.end)
        }
    }
}

/// POST /directions
/// One-shot route between two points, avoiding currently flooded points
/// unless `avoid_flood` is false. Avoidance before the first successful
/// flood data load is refused with 503.
pub async fn get_directions(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DirectionsRequest>,
) -> Result<Json<RouteGeometry>> {
    request.validate().map_err(AppError::InvalidRequest)?;

    let query = request.to_query();
    let exclusions = state.synchronizer.snapshot().exclusions_for(&query)?;

    tracing::info!(
        vehicle = %query.vehicle,
        avoid_flood = query.avoid_flood,
        exclusions = exclusions.len(),
        "Directions request: vehicle={}, avoid_flood={}, {} exclusion points",
        query.vehicle, query.avoid_flood, exclusions.len()
    );

    match state.mapbox.request_route(&query, &exclusions).await {
        RouteResult::Success(route) => Ok(Json(route)),
        RouteResult::Failure(failure) => Err(failure.into()),
    }
}
