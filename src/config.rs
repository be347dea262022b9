use crate::constants::*;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Flood data source domain, also used to absolutise relative image paths
    pub flood_api_domain: String,
    /// Optional: a missing token is reported per route request, not at startup
    pub mapbox_access_token: Option<String>,
    pub mapbox_base_url: Option<String>,
    pub refresh_interval_ms: u64,
    pub max_exclusion_tokens: usize,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let refresh_interval_ms: u64 = env::var("FLOOD_REFRESH_INTERVAL_MS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_INTERVAL_MS.to_string())
            .parse()
            .map_err(|_| "Invalid FLOOD_REFRESH_INTERVAL_MS")?;

        if refresh_interval_ms == 0 {
            return Err("FLOOD_REFRESH_INTERVAL_MS must be greater than 0".to_string());
        }

        let http_timeout_secs: u64 = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_HTTP_TIMEOUT_SECS.to_string())
            .parse()
            .map_err(|_| "Invalid HTTP_TIMEOUT_SECS")?;

        if http_timeout_secs == 0 {
            return Err("HTTP_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            flood_api_domain: env::var("FLOOD_API_DOMAIN")
                .unwrap_or_else(|_| DEFAULT_FLOOD_API_DOMAIN.to_string())
                .trim_end_matches('/')
                .to_string(),
            mapbox_access_token: env::var("MAPBOX_ACCESS_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            mapbox_base_url: env::var("MAPBOX_BASE_URL").ok(),
            refresh_interval_ms,
            max_exclusion_tokens: env::var("MAX_EXCLUSION_TOKENS")
                .unwrap_or_else(|_| DEFAULT_MAX_EXCLUSION_TOKENS.to_string())
                .parse()
                .map_err(|_| "Invalid MAX_EXCLUSION_TOKENS")?,
            http_timeout_secs,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
