// Library exports for testing and reusability

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use services::{LiveDataSynchronizer, MapboxClient, RouteStateCoordinator};
use tokio::sync::Mutex;

// App state for sharing across the application
pub struct AppState {
    pub synchronizer: LiveDataSynchronizer,
    pub mapbox: MapboxClient,
    /// Single shared planner; never locked across a directions request
    pub planner: Mutex<RouteStateCoordinator>,
}

impl AppState {
    pub fn new(synchronizer: LiveDataSynchronizer, mapbox: MapboxClient) -> Self {
        AppState {
            synchronizer,
            mapbox,
            planner: Mutex::new(RouteStateCoordinator::new()),
        }
    }
}
