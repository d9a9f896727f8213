// Per-container report and the /docker-stats response body

use serde::{Deserialize, Serialize};

/// Resource usage of one running container at the time of the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerReport {
    pub container_id: String,
    pub name: String,
    pub cpu_percent: f64,
    pub mem_usage_mb: f64,
    pub mem_limit_mb: f64,
    pub mem_percent: f64,
    pub net_rx_mb: f64,
    pub net_tx_mb: f64,
    pub blk_read_mb: f64,
    pub blk_write_mb: f64,
    pub pids: u64,
}

/// Body of `GET /docker-stats`. Containers appear in the daemon's listing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub containers: Vec<ContainerReport>,
    /// Set when at least one container's stats could not be fetched.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub partial: bool,
}
