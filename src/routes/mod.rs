pub mod directions;
pub mod flood_points;
pub mod health;
pub mod planner;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/flood-points", get(flood_points::list_flood_points))
        .route("/flood-points/{id}", get(flood_points::get_flood_point))
        .route("/directions", post(directions::get_directions))
        .route("/planner", get(planner::get_planner))
        .route("/planner/select", post(planner::request_selection))
        .route("/planner/click", post(planner::map_click))
        .route("/planner/cancel", post(planner::cancel_selection))
        .route("/planner/reset", post(planner::restart_selection))
        .route("/planner/options", put(planner::update_options))
        .route("/planner/query", post(planner::run_query))
        .route("/health", get(health::health_check))
        .with_state(state)
}
