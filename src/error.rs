// Runtime and collection errors

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::time::Duration;

/// Failure talking to the container runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("docker: {0}")]
    Docker(#[from] bollard::errors::Error),
    #[error("no stats returned for container {0}")]
    NoStats(String),
}

/// Failure of a whole `/docker-stats` collection. Per-container failures never
/// end up here; they mark the response as partial instead.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("container runtime unavailable: {0}")]
    RuntimeUnavailable(#[source] RuntimeError),
    #[error("stats collection timed out after {0:?}")]
    Timeout(Duration),
}

impl CollectError {
    pub fn status(&self) -> StatusCode {
        match self {
            CollectError::RuntimeUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CollectError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for CollectError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
