pub mod coordinator;
pub mod exclusion;
pub mod flood_source;
pub mod mapbox;
pub mod synchronizer;

pub use coordinator::{PlannerState, PlannerView, RouteStateCoordinator, TransitionError};
pub use flood_source::{FloodDataSource, HttpFloodSource};
pub use mapbox::MapboxClient;
pub use synchronizer::{FloodSnapshot, LiveDataSynchronizer, RefreshOutcome};
