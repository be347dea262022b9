pub mod coordinates;
pub mod flood_point;
pub mod media;
pub mod route;

pub use coordinates::Coordinates;
pub use flood_point::{FloodPoint, FloodStatus};
pub use media::MediaSource;
pub use route::{
    ExclusionToken, RouteErrorKind, RouteFailure, RouteGeometry, RouteQuery, RouteResult,
    SelectionPoint, SelectionRole, VehicleProfile,
};
