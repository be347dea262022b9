//! Stable application-wide constants.
//!
//! Values here are provider limits, geometry coefficients, and default
//! fallbacks for env-var-based configuration. They should rarely change.
//! Runtime-tunable values live in [`Config`](crate::config::Config).

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- Flood data source ---

/// Default flood data source domain. Overridden by `FLOOD_API_DOMAIN`.
pub const DEFAULT_FLOOD_API_DOMAIN: &str = "https://flood.phoenixtech.vn";
/// Path of the camera listing endpoint, appended to the data source domain.
pub const FLOOD_API_LIST_PATH: &str = "/apis/getListCameraAPI";
/// Success value of the `code` field in data source responses.
pub const FLOOD_API_SUCCESS_CODE: i64 = 1;
/// Default refresh period (ms). Overridden by `FLOOD_REFRESH_INTERVAL_MS`.
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 10_000;

// --- Placeholder images for points without a camera snapshot ---

pub const PLACEHOLDER_IMAGE_BASE_URL: &str = "https://placehold.co/600x400";
pub const PLACEHOLDER_COLOR_FLOODED: &str = "F87171";
pub const PLACEHOLDER_COLOR_CLEAR: &str = "4ADE80";

// --- Directions provider ---

/// Mapbox Directions API base, profile and coordinates are appended.
pub const MAPBOX_DIRECTIONS_BASE_URL: &str = "https://api.mapbox.com/directions/v5/mapbox";
/// Token value shipped in sample configs; treated as "no credential".
pub const MAPBOX_TOKEN_PLACEHOLDER: &str = "YOUR_MAPBOX_ACCESS_TOKEN_HERE";
/// Provider error code returned when no route satisfies the request.
pub const MAPBOX_NO_ROUTE_CODE: &str = "NoRoute";
/// Mapbox accepts at most 50 `point(...)` entries in `exclude`.
/// Overridden by `MAX_EXCLUSION_TOKENS`.
pub const DEFAULT_MAX_EXCLUSION_TOKENS: usize = 50;
/// Default outbound HTTP timeout (seconds). Overridden by `HTTP_TIMEOUT_SECS`.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

// --- Exclusion geometry ---

/// Angular offset (degrees) of the four cardinal blocking points around a
/// flooded sensor. 1 degree of latitude is ~111 km, so 0.0002 is ~22 m.
pub const EXCLUSION_OFFSET_DEGREES: f64 = 0.0002;
/// Tokens emitted per flooded point: centre plus four cardinal offsets.
pub const EXCLUSION_TOKENS_PER_POINT: usize = 5;
