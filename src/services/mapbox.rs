use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{
    ExclusionToken, RouteErrorKind, RouteGeometry, RouteQuery, RouteResult,
};
use crate::services::exclusion::format_exclusions;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Directions client for a Mapbox-compatible provider.
///
/// Every call issues at most one request and never returns `Err`: all
/// failure modes come back as a typed [`RouteResult::Failure`]. Retrying is
/// left to the caller.
#[derive(Clone)]
pub struct MapboxClient {
    client: Client,
    access_token: Option<String>,
    base_url: String,
    max_exclusions: usize,
}

impl MapboxClient {
    pub fn new(access_token: Option<String>) -> Self {
        MapboxClient {
            client: Client::new(),
            access_token,
            base_url: MAPBOX_DIRECTIONS_BASE_URL.to_string(),
            max_exclusions: DEFAULT_MAX_EXCLUSION_TOKENS,
        }
    }

    pub fn with_config(
        access_token: Option<String>,
        base_url: String,
        max_exclusions: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(MapboxClient {
            client,
            access_token,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_exclusions,
        })
    }

    /// A token is usable when present, non-blank, and not the sample placeholder
    pub fn has_credential(&self) -> bool {
        self.usable_token().is_some()
    }

    fn usable_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != MAPBOX_TOKEN_PLACEHOLDER)
    }

    /// Request driving directions for `query`, avoiding `exclusions` when
    /// `query.avoid_flood` is set.
    pub async fn request_route(
        &self,
        query: &RouteQuery,
        exclusions: &[ExclusionToken],
    ) -> RouteResult {
        let (start, end) = match (query.start, query.end) {
            (Some(start), Some(end)) => (start.coordinates, end.coordinates),
            _ => {
                return RouteResult::failure(
                    RouteErrorKind::MissingSelection,
                    "select both a start and an end point",
                )
            }
        };

        let Some(token) = self.usable_token() else {
            return RouteResult::failure(
                RouteErrorKind::MissingCredential,
                "directions access token is not configured",
            );
        };

        let exclude = if query.avoid_flood {
            if exclusions.len() > self.max_exclusions {
                tracing::warn!(
                    tokens = exclusions.len(),
                    limit = self.max_exclusions,
                    "Refusing directions request: {} exclusion points over limit {}",
                    exclusions.len(), self.max_exclusions
                );
                return RouteResult::failure(
                    RouteErrorKind::TooManyExclusions,
                    "too many avoidance zones",
                );
            }
            format_exclusions(exclusions)
        } else {
            None
        };

        let url = format!(
            "{}/{}/{};{}",
            self.base_url,
            query.vehicle.mapbox_profile(),
            start.to_lng_lat(),
            end.to_lng_lat()
        );

        tracing::debug!(
            profile = %query.vehicle.mapbox_profile(),
            exclusions = if exclude.is_some() { exclusions.len() } else { 0 },
            "Directions request: profile {}, {} exclusion points",
            query.vehicle.mapbox_profile(),
            if exclude.is_some() { exclusions.len() } else { 0 }
        );

        let mut request = self.client.get(&url).query(&[
            ("geometries", "geojson"),
            ("overview", "full"),
            ("access_token", token),
        ]);
        if let Some(ref exclude) = exclude {
            request = request.query(&[("exclude", exclude.as_str())]);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Directions request failed: {}", e);
                return RouteResult::failure(
                    RouteErrorKind::NetworkError,
                    format!("Request failed: {}", e),
                );
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return RouteResult::failure(
                    RouteErrorKind::NetworkError,
                    format!("Failed to read response: {}", e),
                )
            }
        };

        interpret_response(status, &body)
    }
}

/// Classify a provider response. Kept separate from I/O so every branch
/// can be exercised with canned bodies.
fn interpret_response(status: StatusCode, body: &str) -> RouteResult {
    if status == StatusCode::URI_TOO_LONG {
        tracing::warn!("Directions provider rejected request as too long");
        return RouteResult::failure(
            RouteErrorKind::TooManyExclusions,
            "too many avoidance zones",
        );
    }

    let parsed = serde_json::from_str::<MapboxDirectionsApiResponse>(body);

    if let Ok(ref directions) = parsed {
        if directions.code.as_deref() == Some(MAPBOX_NO_ROUTE_CODE) {
            return RouteResult::failure(
                RouteErrorKind::NoRoute,
                "no feasible route given current exclusions",
            );
        }
    }

    if !status.is_success() {
        let message = parsed
            .ok()
            .and_then(|d| d.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status));
        tracing::warn!(status = %status, "Directions provider error {}: {}", status, message);
        return RouteResult::failure(RouteErrorKind::ProviderError, message);
    }

    let directions = match parsed {
        Ok(directions) => directions,
        Err(e) => {
            return RouteResult::failure(
                RouteErrorKind::NetworkError,
                format!("Failed to parse response: {}", e),
            )
        }
    };

    // First route is the provider's best
    match directions.routes.into_iter().next() {
        None => RouteResult::failure(RouteErrorKind::NoRoute, "no route returned"),
        Some(route) => {
            tracing::debug!(
                distance_km = %format!("{:.2}", route.distance / 1000.0),
                duration_min = %format!("{:.0}", route.duration / 60.0),
                "Directions response: {:.2}km, {:.0}min",
                route.distance / 1000.0, route.duration / 60.0
            );
            RouteResult::Success(RouteGeometry {
                geometry: route.geometry,
                distance_meters: route.distance,
                duration_seconds: route.duration,
            })
        }
    }
}

// Mapbox API response types

#[derive(Debug, Deserialize)]
struct MapboxDirectionsApiResponse {
    #[serde(default)]
    routes: Vec<MapboxRoute>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MapboxRoute {
    #[serde(default)]
    distance: f64, // meters
    #[serde(default)]
    duration: f64, // seconds
    geometry: geojson::Geometry,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    fn query() -> RouteQuery {
        RouteQuery::new(
            Some(Coordinates::new(10.77, 106.70).unwrap()),
            Some(Coordinates::new(10.80, 106.72).unwrap()),
        )
    }

    #[test]
    fn test_new_defaults() {
        let client = MapboxClient::new(Some("pk.test123".to_string()));
        assert_eq!(client.base_url, MAPBOX_DIRECTIONS_BASE_URL);
        assert_eq!(client.max_exclusions, DEFAULT_MAX_EXCLUSION_TOKENS);
        assert!(client.has_credential());
    }

    #[test]
    fn test_placeholder_token_is_not_a_credential() {
        assert!(!MapboxClient::new(None).has_credential());
        assert!(!MapboxClient::new(Some("  ".to_string())).has_credential());
        assert!(!MapboxClient::new(Some(MAPBOX_TOKEN_PLACEHOLDER.to_string())).has_credential());
    }

    #[tokio::test]
    async fn test_missing_selection_checked_before_credential() {
        let client = MapboxClient::new(None);
        let mut q = query();
        q.start = None;

        let result = client.request_route(&q, &[]).await;
        assert_eq!(result.error().unwrap().kind, RouteErrorKind::MissingSelection);
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let client = MapboxClient::new(None);
        let result = client.request_route(&query(), &[]).await;
        assert_eq!(result.error().unwrap().kind, RouteErrorKind::MissingCredential);
    }

    #[tokio::test]
    async fn test_exclusions_over_limit_fail_without_request() {
        // Unroutable base URL: reaching the network would yield NetworkError
        let client = MapboxClient::with_config(
            Some("pk.test".to_string()),
            "http://127.0.0.1:9/directions".to_string(),
            5,
            Duration::from_secs(1),
        )
        .unwrap();
        let tokens = vec![ExclusionToken(Coordinates::new(10.0, 106.0).unwrap()); 6];

        let result = client.request_route(&query(), &tokens).await;
        assert_eq!(result.error().unwrap().kind, RouteErrorKind::TooManyExclusions);
    }

    #[test]
    fn test_interpret_no_route_code() {
        let result = interpret_response(
            StatusCode::OK,
            r#"{"code":"NoRoute","message":"No route found","routes":[]}"#,
        );
        let failure = result.error().unwrap();
        assert_eq!(failure.kind, RouteErrorKind::NoRoute);
        assert!(!failure.message.is_empty());

        let result = interpret_response(StatusCode::UNPROCESSABLE_ENTITY, r#"{"code":"NoRoute"}"#);
        assert_eq!(result.error().unwrap().kind, RouteErrorKind::NoRoute);
    }

    #[test]
    fn test_interpret_uri_too_long() {
        let result = interpret_response(StatusCode::URI_TOO_LONG, "<html>414</html>");
        assert_eq!(result.error().unwrap().kind, RouteErrorKind::TooManyExclusions);
    }

    #[test]
    fn test_interpret_provider_error_message() {
        let result = interpret_response(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Not Authorized - Invalid Token"}"#,
        );
        let failure = result.error().unwrap();
        assert_eq!(failure.kind, RouteErrorKind::ProviderError);
        assert_eq!(failure.message, "Not Authorized - Invalid Token");

        let result = interpret_response(StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert_eq!(result.error().unwrap().kind, RouteErrorKind::ProviderError);
    }

    #[test]
    fn test_interpret_empty_routes_and_malformed_json() {
        let result = interpret_response(StatusCode::OK, r#"{"code":"Ok","routes":[]}"#);
        let failure = result.error().unwrap();
        assert_eq!(failure.kind, RouteErrorKind::NoRoute);
        assert_eq!(failure.message, "no route returned");

        let result = interpret_response(StatusCode::OK, "{not json");
        assert_eq!(result.error().unwrap().kind, RouteErrorKind::NetworkError);
    }

    #[test]
    fn test_interpret_success_keeps_geometry_unchanged() {
        let geometry_json = r#"{"type":"LineString","coordinates":[[106.7,10.77],[106.71,10.78],[106.72,10.8]]}"#;
        let body = format!(
            r#"{{"code":"Ok","routes":[{{"distance":5240.0,"duration":720.0,"geometry":{}}},{{"distance":9000.0,"duration":900.0,"geometry":{{"type":"LineString","coordinates":[[0.0,0.0],[1.0,1.0]]}}}}]}}"#,
            geometry_json
        );

        let result = interpret_response(StatusCode::OK, &body);
        let route = result.geometry().expect("first route should be returned");
        let expected: geojson::Geometry = serde_json::from_str(geometry_json).unwrap();
        assert_eq!(route.geometry, expected);
        assert_eq!(route.distance_meters, 5240.0);
        assert_eq!(route.duration_seconds, 720.0);
    }
}
