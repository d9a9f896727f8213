// Shared test helpers: a scripted ContainerRuntime and snapshot builders

#![allow(dead_code)]

use async_trait::async_trait;
use bollard::models::{
    ContainerBlkioStats, ContainerCpuStats, ContainerCpuUsage, ContainerMemoryStats,
    ContainerPidsStats, ContainerStatsResponse,
};
use docker_stats_api::collector::{ContainerRuntime, RunningContainer};
use docker_stats_api::error::RuntimeError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const MIB: u64 = 1024 * 1024;

struct FakeContainer {
    container: RunningContainer,
    snapshot: Option<ContainerStatsResponse>,
    delay: Duration,
}

/// In-memory runtime: containers with canned snapshots (None = fetch fails).
#[derive(Default)]
pub struct FakeRuntime {
    containers: Vec<FakeContainer>,
    daemon_down: bool,
    pub list_calls: AtomicUsize,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            daemon_down: true,
            ..Default::default()
        }
    }

    pub fn with(self, id: &str, name: &str, snapshot: Option<ContainerStatsResponse>) -> Self {
        self.with_delay(id, name, snapshot, Duration::ZERO)
    }

    pub fn with_delay(
        mut self,
        id: &str,
        name: &str,
        snapshot: Option<ContainerStatsResponse>,
        delay: Duration,
    ) -> Self {
        self.containers.push(FakeContainer {
            container: RunningContainer {
                id: id.into(),
                name: name.into(),
            },
            snapshot,
            delay,
        });
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

fn daemon_error(message: &str) -> RuntimeError {
    RuntimeError::Docker(bollard::errors::Error::DockerResponseServerError {
        status_code: 500,
        message: message.into(),
    })
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn list_running(&self) -> Result<Vec<RunningContainer>, RuntimeError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.daemon_down {
            return Err(daemon_error("Cannot connect to the Docker daemon"));
        }
        Ok(self.containers.iter().map(|c| c.container.clone()).collect())
    }

    async fn stats_snapshot(&self, id: &str) -> Result<ContainerStatsResponse, RuntimeError> {
        let c = self
            .containers
            .iter()
            .find(|c| c.container.id == id)
            .ok_or_else(|| daemon_error("No such container"))?;
        if !c.delay.is_zero() {
            tokio::time::sleep(c.delay).await;
        }
        c.snapshot
            .clone()
            .ok_or_else(|| daemon_error("container is not running"))
    }
}

pub fn cpu_stats(total_usage: u64, system_cpu_usage: u64, cores: usize) -> ContainerCpuStats {
    ContainerCpuStats {
        cpu_usage: Some(ContainerCpuUsage {
            total_usage: Some(total_usage),
            percpu_usage: Some(vec![0; cores]),
            ..Default::default()
        }),
        system_cpu_usage: Some(system_cpu_usage),
        ..Default::default()
    }
}

/// 80% CPU on 4 cores, 256 MiB of 512 MiB, no networks, empty blkio, 3 pids.
pub fn full_snapshot() -> ContainerStatsResponse {
    ContainerStatsResponse {
        cpu_stats: Some(cpu_stats(1_200_000_000, 6_000_000_000, 4)),
        precpu_stats: Some(cpu_stats(1_000_000_000, 5_000_000_000, 4)),
        memory_stats: Some(ContainerMemoryStats {
            usage: Some(256 * MIB),
            limit: Some(512 * MIB),
            ..Default::default()
        }),
        networks: Some(HashMap::new()),
        blkio_stats: Some(ContainerBlkioStats {
            io_service_bytes_recursive: Some(vec![]),
            ..Default::default()
        }),
        pids_stats: Some(ContainerPidsStats {
            current: Some(3),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// A container's first sample: no precpu baseline yet.
pub fn first_sample_snapshot() -> ContainerStatsResponse {
    ContainerStatsResponse {
        precpu_stats: Some(ContainerCpuStats::default()),
        ..full_snapshot()
    }
}
