use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, FloodPoint, FloodStatus};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use time::OffsetDateTime;

/// Polled provider of the current set of monitored points.
#[async_trait]
pub trait FloodDataSource: Send + Sync {
    /// Fetch the full point set. Any failure (transport, parse, or an
    /// error envelope) is `Err`; callers decide how to degrade.
    async fn fetch_points(&self) -> Result<Vec<FloodPoint>>;
}

/// Camera listing API of the flood monitoring backend.
#[derive(Clone)]
pub struct HttpFloodSource {
    client: Client,
    domain: String,
}

impl HttpFloodSource {
    pub fn new(domain: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpFloodSource {
            client,
            domain: domain.trim_end_matches('/').to_string(),
        })
    }

    fn list_url(&self) -> String {
        format!("{}{}", self.domain, FLOOD_API_LIST_PATH)
    }
}

#[async_trait]
impl FloodDataSource for HttpFloodSource {
    async fn fetch_points(&self) -> Result<Vec<FloodPoint>> {
        let response = self
            .client
            .post(self.list_url())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| AppError::DataSource(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::DataSource(format!("HTTP {}", response.status())));
        }

        let envelope: ApiEnvelope = response
            .json()
            .await
            .map_err(|e| AppError::DataSource(format!("Failed to parse response: {}", e)))?;

        parse_envelope(envelope, &self.domain)
    }
}

// ---------------------------------------------------------------------------
// Wire types and row conversion
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    code: i64,
    #[serde(default)]
    mess: Option<String>,
    data: Option<Vec<ApiCameraRow>>,
}

/// The backend is loose about numbers vs. numeric strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Loose {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Loose::Int(i) => Some(*i as f64),
            Loose::Float(f) => Some(*f),
            Loose::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_id(&self) -> String {
        match self {
            Loose::Int(i) => i.to_string(),
            Loose::Float(f) => f.to_string(),
            Loose::Text(s) => s.clone(),
        }
    }
}

/// Every field is optional so that one sparse row cannot fail the batch;
/// `into_point` decides what a row needs to survive.
#[derive(Debug, Deserialize)]
struct ApiCameraRow {
    #[serde(default)]
    id: Option<Loose>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    lat_gps: Option<Loose>,
    #[serde(default)]
    long_gps: Option<Loose>,
    #[serde(default)]
    status_flood: Option<Loose>,
    #[serde(default)]
    update_at: Option<Loose>,
    #[serde(default)]
    image: Option<Loose>,
    #[serde(default)]
    depth: Option<Loose>,
    #[serde(default)]
    speed_max: Option<Loose>,
    #[serde(default)]
    width: Option<Loose>,
    #[serde(default)]
    acreage: Option<Loose>,
    #[serde(default)]
    link_live_stream: Option<Loose>,
}

fn parse_envelope(envelope: ApiEnvelope, domain: &str) -> Result<Vec<FloodPoint>> {
    if envelope.code != FLOOD_API_SUCCESS_CODE {
        return Err(AppError::DataSource(format!(
            "code {}: {}",
            envelope.code,
            envelope.mess.unwrap_or_default()
        )));
    }

    let rows = envelope
        .data
        .ok_or_else(|| AppError::DataSource("response has no data".to_string()))?;

    Ok(rows
        .into_iter()
        .filter_map(|row| row.into_point(domain))
        .collect())
}

impl ApiCameraRow {
    /// Rows without an id or with missing/unusable coordinates are dropped;
    /// the rest of the batch survives. A missing status reads as clear.
    fn into_point(self, domain: &str) -> Option<FloodPoint> {
        let name = self.name.unwrap_or_default();
        let Some(id) = self.id.as_ref().map(Loose::as_id) else {
            tracing::warn!("Dropping flood point '{}': missing id", name);
            return None;
        };

        let lat = self.lat_gps.as_ref().and_then(Loose::as_f64);
        let lng = self.long_gps.as_ref().and_then(Loose::as_f64);
        let coordinates = match (lat, lng) {
            (Some(lat), Some(lng)) => Coordinates::new(lat, lng),
            _ => Err("missing or unparseable coordinates".to_string()),
        };
        let coordinates = match coordinates {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Dropping flood point '{}' (id: {}): {}", name, id, e);
                return None;
            }
        };

        let update_at = self
            .update_at
            .as_ref()
            .and_then(Loose::as_f64)
            .map(|t| t as i64)
            .unwrap_or_default();
        let updated_at = OffsetDateTime::from_unix_timestamp(update_at).unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid update timestamp {} for flood point '{}', using epoch",
                update_at,
                name
            );
            OffsetDateTime::UNIX_EPOCH
        });

        let status = self
            .status_flood
            .as_ref()
            .and_then(Loose::as_f64)
            .map_or(FloodStatus::Clear, |code| FloodStatus::from_code(code as i64));
        let image = self.image.as_ref().map(Loose::as_id);
        let image_url = image_url(image.as_deref(), status, &name, domain);

        Some(FloodPoint {
            id,
            name,
            coordinates,
            status,
            updated_at,
            image_url,
            depth_cm: self.depth.as_ref().and_then(Loose::as_f64),
            width_m: self.width.as_ref().and_then(Loose::as_f64),
            affected_area_m2: self.acreage.as_ref().and_then(Loose::as_f64),
            max_speed_kmh: self.speed_max.as_ref().and_then(Loose::as_f64),
            live_stream_url: self
                .link_live_stream
                .as_ref()
                .map(|s| s.as_id().trim().to_string())
                .filter(|s| !s.is_empty()),
        })
    }
}

/// Absolute camera image URL, or a coloured placeholder naming the point.
fn image_url(image: Option<&str>, status: FloodStatus, name: &str, domain: &str) -> String {
    match image.map(str::trim).filter(|s| !s.is_empty()) {
        Some(path) if path.starts_with('/') => format!("{}{}", domain, path),
        Some(url) => url.to_string(),
        None => {
            let color = match status {
                FloodStatus::Flooded => PLACEHOLDER_COLOR_FLOODED,
                FloodStatus::Clear => PLACEHOLDER_COLOR_CLEAR,
            };
            format!(
                "{}/{}/FFFFFF?text={}",
                PLACEHOLDER_IMAGE_BASE_URL,
                color,
                urlencoding::encode(name)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOMAIN: &str = "https://flood.example.vn";

    fn envelope(value: serde_json::Value) -> ApiEnvelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_rows() {
        let points = parse_envelope(
            envelope(json!({
                "code": 1,
                "mess": "ok",
                "data": [{
                    "id": 7,
                    "name": "Ngã tư Thủ Đức",
                    "lat_gps": "10.8494",
                    "long_gps": "106.7537",
                    "status_flood": 1,
                    "update_at": 1_700_000_000,
                    "image": "/uploads/cam7.jpg",
                    "depth": 25,
                    "speed_max": null,
                    "width": "3.5",
                    "acreage": null,
                    "link_live_stream": "https://cdn.example.vn/cam7.m3u8"
                }]
            })),
            DOMAIN,
        )
        .unwrap();

        assert_eq!(points.len(), 1);
        let p = &points[0];
        assert_eq!(p.id, "7");
        assert_eq!(p.coordinates.lat, 10.8494);
        assert_eq!(p.coordinates.lng, 106.7537);
        assert_eq!(p.status, FloodStatus::Flooded);
        assert_eq!(p.updated_at.unix_timestamp(), 1_700_000_000);
        assert_eq!(p.image_url, "https://flood.example.vn/uploads/cam7.jpg");
        assert_eq!(p.depth_cm, Some(25.0));
        assert_eq!(p.width_m, Some(3.5));
        assert_eq!(p.max_speed_kmh, None);
        assert_eq!(
            p.live_stream_url.as_deref(),
            Some("https://cdn.example.vn/cam7.m3u8")
        );
    }

    #[test]
    fn test_error_code_and_missing_data_are_failures() {
        let err = parse_envelope(envelope(json!({"code": 0, "mess": "denied"})), DOMAIN);
        assert!(matches!(err, Err(AppError::DataSource(_))));

        let err = parse_envelope(envelope(json!({"code": 1, "mess": "ok"})), DOMAIN);
        assert!(matches!(err, Err(AppError::DataSource(_))));
    }

    #[test]
    fn test_bad_rows_are_dropped() {
        let points = parse_envelope(
            envelope(json!({
                "code": 1,
                "data": [
                    {"id": 1, "name": "ok", "lat_gps": "10.1", "long_gps": "106.1", "status_flood": 0, "update_at": 0},
                    {"id": 2, "name": "bad", "lat_gps": "abc", "long_gps": "106.1", "status_flood": 0, "update_at": 0},
                    {"id": 3, "name": "far", "lat_gps": "95", "long_gps": "106.1", "status_flood": 1, "update_at": 0}
                ]
            })),
            DOMAIN,
        )
        .unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, "1");
    }

    #[test]
    fn test_null_fields_only_affect_their_row() {
        let points = parse_envelope(
            envelope(json!({
                "code": 1,
                "data": [
                    {"id": 1, "name": "ok", "lat_gps": "10.1", "long_gps": "106.1", "status_flood": 1, "update_at": 0},
                    {"id": 2, "name": "no coords", "lat_gps": null, "long_gps": "106.1", "status_flood": 1, "update_at": 0},
                    {"id": 3, "name": null, "lat_gps": "10.2", "long_gps": "106.2", "status_flood": null, "update_at": null},
                    {"id": null, "name": "no id", "lat_gps": "10.3", "long_gps": "106.3", "status_flood": 1}
                ]
            })),
            DOMAIN,
        )
        .unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].id, "1");
        assert_eq!(points[0].status, FloodStatus::Flooded);
        assert_eq!(points[1].id, "3");
        assert_eq!(points[1].status, FloodStatus::Clear);
        assert_eq!(points[1].name, "");
        assert_eq!(points[1].updated_at, OffsetDateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_image_url_variants() {
        assert_eq!(
            image_url(Some("https://img.example/x.jpg"), FloodStatus::Clear, "x", DOMAIN),
            "https://img.example/x.jpg"
        );
        assert_eq!(
            image_url(None, FloodStatus::Flooded, "Cầu Bông", DOMAIN),
            "https://placehold.co/600x400/F87171/FFFFFF?text=C%E1%BA%A7u%20B%C3%B4ng"
        );
        assert_eq!(
            image_url(Some(""), FloodStatus::Clear, "A", DOMAIN),
            "https://placehold.co/600x400/4ADE80/FFFFFF?text=A"
        );
    }

    #[test]
    fn test_list_url() {
        let source = HttpFloodSource::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(source.list_url(), "http://localhost:8080/apis/getListCameraAPI");
    }
}
