// GET /docker-stats

use axum::{Json, extract::State};

use super::AppState;
use crate::error::CollectError;
use crate::models::StatsResponse;

/// GET /docker-stats — one report per running container, bounded by the request timeout.
pub(super) async fn docker_stats_handler(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, CollectError> {
    let result = tokio::time::timeout(state.request_timeout, state.collector.collect())
        .await
        .map_err(|_| CollectError::Timeout(state.request_timeout))
        .and_then(|r| r);

    match result {
        Ok(response) => {
            tracing::debug!(
                containers = response.containers.len(),
                partial = response.partial,
                "docker stats collected"
            );
            Ok(Json(response))
        }
        Err(e) => {
            tracing::error!(error = %e, "docker stats collection failed");
            Err(e)
        }
    }
}
