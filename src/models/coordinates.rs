use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(format!(
                "Invalid latitude: {} (must be between -90 and 90)",
                lat
            ));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(format!(
                "Invalid longitude: {} (must be between -180 and 180)",
                lng
            ));
        }
        Ok(Coordinates { lat, lng })
    }

    /// Re-run range validation, for values that arrived through serde
    pub fn validate(&self) -> Result<(), String> {
        Coordinates::new(self.lat, self.lng).map(|_| ())
    }

    /// Shift by a fixed angular displacement (degrees), no wrapping
    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        Coordinates {
            lat: self.lat + d_lat,
            lng: self.lng + d_lng,
        }
    }

    /// "lng,lat" as used in directions URL paths
    pub fn to_lng_lat(&self) -> String {
        format!("{},{}", self.lng, self.lat)
    }
}
