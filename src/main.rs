use anyhow::Result;
use docker_stats_api::collector::{CollectorConfig, ContainerRuntime, StatsCollector};
use docker_stats_api::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Received shutdown signal");
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let docker_repo = match &app_config.docker.socket {
        Some(path) => docker_repo::DockerRepo::connect_socket(path, app_config.docker.timeout_secs)?,
        None => docker_repo::DockerRepo::connect()?,
    };
    match docker_repo.ping().await {
        Ok(()) => tracing::info!("Connected to Docker daemon"),
        Err(e) => tracing::warn!(error = %e, "Docker daemon not reachable yet"),
    }
    let runtime: Arc<dyn ContainerRuntime> = Arc::new(docker_repo);

    let collector = Arc::new(StatsCollector::new(
        runtime,
        CollectorConfig {
            max_concurrency: app_config.collector.max_concurrency,
            cache_ttl: app_config.collector.cache_ttl(),
        },
    ));

    let app = routes::app(collector, app_config.collector.request_timeout());
    let addr = app_config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
