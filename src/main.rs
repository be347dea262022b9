use axum::Router;
use floodroute::config::Config;
use floodroute::constants::MAPBOX_DIRECTIONS_BASE_URL;
use floodroute::services::{
    HttpFloodSource, LiveDataSynchronizer, MapboxClient, RefreshOutcome,
};
use floodroute::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "floodroute=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting floodroute API server");
    tracing::info!(domain = %config.flood_api_domain, "Configuration loaded successfully");

    if config.mapbox_access_token.is_none() {
        tracing::warn!("MAPBOX_ACCESS_TOKEN not set; directions requests will fail");
    }

    // Initialize services
    let source = HttpFloodSource::new(&config.flood_api_domain, config.http_timeout())?;
    let synchronizer = LiveDataSynchronizer::new(Arc::new(source));

    let mapbox_client = MapboxClient::with_config(
        config.mapbox_access_token.clone(),
        config
            .mapbox_base_url
            .clone()
            .unwrap_or_else(|| MAPBOX_DIRECTIONS_BASE_URL.to_string()),
        config.max_exclusion_tokens,
        config.http_timeout(),
    )?;

    // Initial load so the first requests are not served an empty set
    match synchronizer.refresh_now().await {
        RefreshOutcome::Updated(count) => tracing::info!("Loaded {} flood points", count),
        RefreshOutcome::Failed(reason) => {
            tracing::warn!("Initial flood data load failed, will retry on schedule: {}", reason)
        }
        RefreshOutcome::Skipped => {}
    }

    synchronizer.start(
        config.refresh_interval(),
        |points| {
            let flooded = points.iter().filter(|p| p.is_flooded()).count();
            tracing::debug!(
                points = points.len(),
                flooded,
                "Flood data updated: {} points, {} flooded",
                points.len(), flooded
            );
        },
        |e| tracing::warn!("Flood data refresh failed: {}", e),
    );

    // Create application state
    let state = Arc::new(AppState::new(synchronizer.clone(), mapbox_client));

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", floodroute::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    synchronizer.stop();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
