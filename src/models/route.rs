use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SelectionRole {
    Start,
    End,
}

impl fmt::Display for SelectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionRole::Start => write!(f, "start"),
            SelectionRole::End => write!(f, "end"),
        }
    }
}

/// A coordinate picked on the map by the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SelectionPoint {
    pub role: SelectionRole,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VehicleProfile {
    #[default]
    Motorbike,
    Car,
    Cycling,
    Walking,
}

impl VehicleProfile {
    /// Returns the Mapbox profile name for this vehicle.
    /// Mapbox has no motorbike profile; motorbikes route like cars.
    pub fn mapbox_profile(&self) -> &str {
        match self {
            VehicleProfile::Motorbike | VehicleProfile::Car => "driving",
            VehicleProfile::Cycling => "cycling",
            VehicleProfile::Walking => "walking",
        }
    }
}

impl fmt::Display for VehicleProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleProfile::Motorbike => write!(f, "motorbike"),
            VehicleProfile::Car => write!(f, "car"),
            VehicleProfile::Cycling => write!(f, "cycling"),
            VehicleProfile::Walking => write!(f, "walking"),
        }
    }
}

impl FromStr for VehicleProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "motorbike" | "motobike" | "motorcycle" => Ok(VehicleProfile::Motorbike),
            "car" | "driving" => Ok(VehicleProfile::Car),
            "cycling" | "bike" | "bicycle" => Ok(VehicleProfile::Cycling),
            "walking" | "walk" => Ok(VehicleProfile::Walking),
            _ => Err(format!("Invalid vehicle profile: '{}'", s)),
        }
    }
}

/// One blocked coordinate submitted to the directions provider.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ExclusionToken(pub Coordinates);

impl fmt::Display for ExclusionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "point({} {})", self.0.lng, self.0.lat)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct RouteQuery {
    pub start: Option<SelectionPoint>,
    pub end: Option<SelectionPoint>,
    pub avoid_flood: bool,
    pub vehicle: VehicleProfile,
}

impl RouteQuery {
    /// Query with avoidance on and the default vehicle; either point may
    /// still be missing.
    pub fn new(start: Option<Coordinates>, end: Option<Coordinates>) -> Self {
        RouteQuery {
            start: start.map(|coordinates| SelectionPoint {
                role: SelectionRole::Start,
                coordinates,
            }),
            end: end.map(|coordinates| SelectionPoint {
                role: SelectionRole::End,
                coordinates,
            }),
            avoid_flood: true,
            vehicle: VehicleProfile::default(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RouteErrorKind {
    MissingSelection,
    MissingCredential,
    NoRoute,
    TooManyExclusions,
    ProviderError,
    NetworkError,
    DataSourceUnavailable,
}

#[derive(Debug, Clone, Serialize, PartialEq, Error)]
#[error("{message}")]
pub struct RouteFailure {
    pub kind: RouteErrorKind,
    pub message: String,
}

impl RouteFailure {
    pub fn new(kind: RouteErrorKind, message: impl Into<String>) -> Self {
        RouteFailure {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteGeometry {
    /// Provider geometry, passed through unchanged
    pub geometry: geojson::Geometry,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// Outcome of exactly one directions request.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RouteResult {
    Success(RouteGeometry),
    Failure(RouteFailure),
}

impl RouteResult {
    pub fn failure(kind: RouteErrorKind, message: impl Into<String>) -> Self {
        RouteResult::Failure(RouteFailure::new(kind, message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RouteResult::Success(_))
    }

    pub fn geometry(&self) -> Option<&RouteGeometry> {
        match self {
            RouteResult::Success(route) => Some(route),
            RouteResult::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&RouteFailure> {
        match self {
            RouteResult::Success(_) => None,
            RouteResult::Failure(failure) => Some(failure),
        }
    }
}
