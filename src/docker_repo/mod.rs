// Docker container listing and one-shot stats via bollard

use crate::collector::{ContainerRuntime, RunningContainer};
use crate::error::{Result, RuntimeError};
use async_trait::async_trait;
use bollard::Docker;
use bollard::models::ContainerStatsResponse;
use bollard::query_parameters::{ListContainersOptions, StatsOptions};
use futures_util::StreamExt;
use std::collections::HashMap;

pub struct DockerRepo {
    docker: Docker,
}

impl DockerRepo {
    /// Connect with bollard's unix defaults (honors `DOCKER_HOST`).
    pub fn connect() -> anyhow::Result<Self> {
        let docker = Docker::connect_with_unix_defaults()?;
        Ok(Self { docker })
    }

    /// Connect to an explicit socket path.
    pub fn connect_socket(path: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let docker = Docker::connect_with_unix(path, timeout_secs, bollard::API_DEFAULT_VERSION)?;
        Ok(Self { docker })
    }

    /// Round-trip to the daemon. Connecting is lazy, so this is the first real check.
    pub async fn ping(&self) -> Result<()> {
        self.docker.ping().await?;
        Ok(())
    }
}

fn display_name(names: Option<&Vec<String>>, id: &str) -> String {
    names
        .and_then(|n| n.first())
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_else(|| id.to_string())
}

#[async_trait]
impl ContainerRuntime for DockerRepo {
    async fn list_running(&self) -> Result<Vec<RunningContainer>> {
        let mut filters = HashMap::new();
        filters.insert("status".to_string(), vec!["running".to_string()]);

        let filter = ListContainersOptions {
            all: false,
            filters: Some(filters),
            ..Default::default()
        };

        let containers = self.docker.list_containers(Some(filter)).await?;
        Ok(containers
            .into_iter()
            .map(|c| {
                let id = c.id.unwrap_or_default();
                let name = display_name(c.names.as_ref(), &id);
                RunningContainer { id, name }
            })
            .collect())
    }

    async fn stats_snapshot(&self, id: &str) -> Result<ContainerStatsResponse> {
        // one_shot = false: the daemon waits for a second sample so precpu_stats is filled.
        let options = StatsOptions {
            stream: false,
            one_shot: false,
            ..Default::default()
        };
        let mut stream = self.docker.stats(id, Some(options));
        match stream.next().await {
            Some(result) => Ok(result?),
            None => Err(RuntimeError::NoStats(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_strips_leading_slash() {
        let names = vec!["/web".to_string(), "/alias".to_string()];
        assert_eq!(display_name(Some(&names), "abc"), "web");
    }

    #[test]
    fn display_name_falls_back_to_id() {
        assert_eq!(display_name(None, "abc"), "abc");
        assert_eq!(display_name(Some(&vec![]), "abc"), "abc");
    }
}
