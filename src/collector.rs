// Per-request stats collection: list running containers, fetch one snapshot
// each, normalize into reports.

use crate::error::{CollectError, RuntimeError};
use crate::models::{ContainerReport, StatsResponse};
use crate::normalizer::{self, CpuFallback};
use async_trait::async_trait;
use bollard::models::ContainerStatsResponse;
use futures_util::{StreamExt, stream};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// A running container as returned by the runtime's listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningContainer {
    pub id: String,
    pub name: String,
}

/// Read-only view of a container runtime daemon.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Running containers, in the daemon's listing order.
    async fn list_running(&self) -> Result<Vec<RunningContainer>, RuntimeError>;

    /// One point-in-time stats snapshot (never a stream).
    async fn stats_snapshot(&self, id: &str) -> Result<ContainerStatsResponse, RuntimeError>;
}

pub struct CollectorConfig {
    /// Max snapshots fetched concurrently within one collection.
    pub max_concurrency: usize,
    /// How long a finished collection is reused. Zero disables caching.
    pub cache_ttl: Duration,
}

pub struct StatsCollector {
    runtime: Arc<dyn ContainerRuntime>,
    max_concurrency: usize,
    cache_ttl: Duration,
    // Held across the whole collection so concurrent callers share one daemon round.
    cache: Mutex<Option<(Instant, StatsResponse)>>,
}

impl StatsCollector {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, config: CollectorConfig) -> Self {
        Self {
            runtime,
            max_concurrency: config.max_concurrency.max(1),
            cache_ttl: config.cache_ttl,
            cache: Mutex::new(None),
        }
    }

    pub async fn collect(&self) -> Result<StatsResponse, CollectError> {
        if self.cache_ttl.is_zero() {
            return self.collect_uncached().await;
        }

        let mut cached = self.cache.lock().await;
        if let Some((taken_at, response)) = cached.as_ref()
            && taken_at.elapsed() < self.cache_ttl
        {
            debug!("serving cached container stats");
            return Ok(response.clone());
        }
        let response = self.collect_uncached().await?;
        *cached = Some((Instant::now(), response.clone()));
        Ok(response)
    }

    async fn collect_uncached(&self) -> Result<StatsResponse, CollectError> {
        let containers = self
            .runtime
            .list_running()
            .await
            .map_err(CollectError::RuntimeUnavailable)?;
        let listed = containers.len();

        let containers: Vec<ContainerReport> = stream::iter(containers)
            .map(|c| self.report_for(c))
            .buffered(self.max_concurrency)
            .filter_map(|r| async move { r })
            .collect()
            .await;

        let partial = containers.len() < listed;
        if partial {
            warn!(
                listed,
                reported = containers.len(),
                "container stats incomplete; skipped containers whose stats fetch failed"
            );
        }
        Ok(StatsResponse {
            containers,
            partial,
        })
    }

    async fn report_for(&self, container: RunningContainer) -> Option<ContainerReport> {
        match self.runtime.stats_snapshot(&container.id).await {
            Ok(snapshot) => Some(build_report(&container, &snapshot)),
            Err(e) => {
                warn!(
                    id = %container.id,
                    container = %container.name,
                    error = %e,
                    "stats fetch failed, skipping container"
                );
                None
            }
        }
    }
}

/// Build one report from a raw snapshot. Missing sub-fields degrade to zero.
pub fn build_report(container: &RunningContainer, s: &ContainerStatsResponse) -> ContainerReport {
    let cpu_percent = match normalizer::cpu_percent(s) {
        Ok(p) => p,
        Err(CpuFallback::FirstSample) => {
            debug!(container = %container.name, "no precpu baseline yet, cpu_percent = 0");
            0.0
        }
        Err(e) => {
            warn!(container = %container.name, error = %e, "cannot compute cpu_percent");
            0.0
        }
    };

    let memory = s.memory_stats.as_ref();
    let mem_usage = memory.and_then(|m| m.usage).unwrap_or(0);
    let mem_limit = memory.and_then(|m| m.limit).unwrap_or(0);

    let (net_rx, net_tx) = normalizer::aggregate_network_io(s.networks.as_ref());
    let (blk_read, blk_write) = normalizer::aggregate_block_io(
        s.blkio_stats
            .as_ref()
            .and_then(|b| b.io_service_bytes_recursive.as_deref()),
    );

    let pids = s.pids_stats.as_ref().and_then(|p| p.current).unwrap_or(0);

    ContainerReport {
        container_id: container.id.clone(),
        name: container.name.clone(),
        cpu_percent,
        mem_usage_mb: normalizer::bytes_to_megabytes(mem_usage),
        mem_limit_mb: normalizer::bytes_to_megabytes(mem_limit),
        mem_percent: normalizer::memory_percent(mem_usage, mem_limit),
        net_rx_mb: normalizer::bytes_to_megabytes(net_rx),
        net_tx_mb: normalizer::bytes_to_megabytes(net_tx),
        blk_read_mb: normalizer::bytes_to_megabytes(blk_read),
        blk_write_mb: normalizer::bytes_to_megabytes(blk_write),
        pids,
    }
}
