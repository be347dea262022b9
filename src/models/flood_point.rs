use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FloodStatus {
    Flooded,
    #[default]
    Clear,
}

impl FloodStatus {
    /// Data source encodes status as 1 (flooded) / 0 (clear)
    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            FloodStatus::Flooded
        } else {
            FloodStatus::Clear
        }
    }
}

impl fmt::Display for FloodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloodStatus::Flooded => write!(f, "flooded"),
            FloodStatus::Clear => write!(f, "clear"),
        }
    }
}

/// One monitored sensor point, as of the last successful refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FloodPoint {
    pub id: String,
    pub name: String,
    pub coordinates: Coordinates,
    pub status: FloodStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Camera snapshot, or a generated placeholder
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_area_m2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed_kmh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_stream_url: Option<String>,
}

impl FloodPoint {
    pub fn is_flooded(&self) -> bool {
        self.status == FloodStatus::Flooded
    }
}
