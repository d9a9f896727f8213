// HTTP routes

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::collector::StatsCollector;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) collector: Arc<StatsCollector>,
    pub(crate) request_timeout: Duration,
}

pub fn app(collector: Arc<StatsCollector>, request_timeout: Duration) -> Router {
    let state = AppState {
        collector,
        request_timeout,
    };
    Router::new()
        .route("/docker-stats", get(http::docker_stats_handler)) // GET /docker-stats
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
