use crate::models::{RouteErrorKind, RouteFailure};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Flood data source unavailable: {0}")]
    DataSource(String),

    #[error("Route request failed: {0}")]
    Route(#[from] RouteFailure),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl RouteErrorKind {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RouteErrorKind::MissingSelection => StatusCode::BAD_REQUEST,
            RouteErrorKind::MissingCredential => StatusCode::SERVICE_UNAVAILABLE,
            RouteErrorKind::NoRoute => StatusCode::UNPROCESSABLE_ENTITY,
            RouteErrorKind::TooManyExclusions => StatusCode::PAYLOAD_TOO_LARGE,
            RouteErrorKind::ProviderError => StatusCode::BAD_GATEWAY,
            RouteErrorKind::NetworkError => StatusCode::BAD_GATEWAY,
            RouteErrorKind::DataSourceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::DataSource(ref e) => {
                tracing::warn!("Flood data source error: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Flood data unavailable")
            }
            AppError::Route(ref failure) => {
                tracing::info!(kind = ?failure.kind, "Route request failed: {}", failure.message);
                (failure.kind.status_code(), failure.message.as_str())
            }
            AppError::InvalidRequest(ref e) => (StatusCode::BAD_REQUEST, e.as_str()),
            AppError::Conflict(ref e) => (StatusCode::CONFLICT, e.as_str()),
            AppError::NotFound(ref e) => (StatusCode::NOT_FOUND, e.as_str()),
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
