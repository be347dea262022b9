use async_trait::async_trait;
use axum::http::{Method, StatusCode, Uri};
use axum::Router;
use floodroute::models::{Coordinates, FloodPoint, FloodStatus};
use floodroute::services::{FloodDataSource, FloodSnapshot};
use floodroute::{AppError, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;
use tokio::sync::Notify;

/// One request seen by a mock server
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
}

/// Local HTTP server answering every request with a canned response
#[allow(dead_code)]
pub struct MockServer {
    pub base_url: String,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[allow(dead_code)]
impl MockServer {
    pub async fn start(status: StatusCode, body: impl Into<String>) -> Self {
        let body: String = body.into();
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let rec = recorded.clone();

        let app = Router::new().fallback(move |method: Method, uri: Uri| {
            let rec = rec.clone();
            let body = body.clone();
            async move {
                let query = reqwest::Url::parse(&format!("http://mock{}", uri))
                    .map(|url| url.query_pairs().into_owned().collect())
                    .unwrap_or_default();
                rec.lock().unwrap().push(RecordedRequest {
                    method,
                    path: uri.path().to_string(),
                    query,
                });
                (status, body)
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockServer {
            base_url: format!("http://{}", addr),
            recorded,
        }
    }

    /// Base URL shaped like the Mapbox directions endpoint
    pub fn directions_url(&self) -> String {
        format!("{}/directions/v5/mapbox", self.base_url)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().unwrap().clone()
    }
}

/// Create a test flood point
#[allow(dead_code)]
pub fn flood_point(id: &str, lat: f64, lng: f64, status: FloodStatus) -> FloodPoint {
    FloodPoint {
        id: id.to_string(),
        name: format!("Camera {}", id),
        coordinates: Coordinates::new(lat, lng).unwrap(),
        status,
        updated_at: OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        image_url: format!("https://img.example/{}.jpg", id),
        depth_cm: None,
        width_m: None,
        affected_area_m2: None,
        max_speed_kmh: None,
        live_stream_url: None,
    }
}

/// Two flooded points and one clear one around Ho Chi Minh City
#[allow(dead_code)]
pub fn sample_points() -> Vec<FloodPoint> {
    vec![
        flood_point("a", 10.7769, 106.7009, FloodStatus::Flooded),
        flood_point("b", 10.7900, 106.7100, FloodStatus::Clear),
        flood_point("c", 10.8000, 106.7200, FloodStatus::Flooded),
    ]
}

/// Snapshot as the synchronizer would hold it after a successful refresh
#[allow(dead_code)]
pub fn loaded_snapshot(points: Vec<FloodPoint>) -> FloodSnapshot {
    FloodSnapshot {
        points: Arc::new(points),
        refreshed_at: Some(OffsetDateTime::now_utc()),
    }
}

#[allow(dead_code)]
pub const ONE_ROUTE_BODY: &str = r#"{"code":"Ok","routes":[{"distance":4210.5,"duration":655.2,"geometry":{"type":"LineString","coordinates":[[106.7,10.77],[106.71,10.79],[106.72,10.8]]}}],"waypoints":[]}"#;

#[allow(dead_code)]
pub const NO_ROUTE_BODY: &str = r#"{"code":"NoRoute","message":"No route found","routes":[]}"#;

/// Source replaying a fixed script of outcomes, then repeating the last one
#[allow(dead_code)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<std::result::Result<Vec<FloodPoint>, String>>>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedSource {
    pub fn new(script: Vec<std::result::Result<Vec<FloodPoint>, String>>) -> Arc<Self> {
        Arc::new(ScriptedSource {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FloodDataSource for ScriptedSource {
    async fn fetch_points(&self) -> Result<Vec<FloodPoint>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        let next = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        next.unwrap_or_else(|| Ok(Vec::new()))
            .map_err(AppError::DataSource)
    }
}

/// Source that blocks every fetch until released
#[allow(dead_code)]
pub struct GatedSource {
    pub gate: Notify,
    points: Vec<FloodPoint>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl GatedSource {
    pub fn new(points: Vec<FloodPoint>) -> Arc<Self> {
        Arc::new(GatedSource {
            gate: Notify::new(),
            points,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FloodDataSource for GatedSource {
    async fn fetch_points(&self) -> Result<Vec<FloodPoint>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(self.points.clone())
    }
}
