// Raw Docker stats counters -> percentages and megabytes.

use bollard::models::{ContainerBlkioStatEntry, ContainerNetworkStats, ContainerStatsResponse};
use std::collections::HashMap;

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Why a CPU percentage could not be computed from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CpuFallback {
    /// No previous-sample baseline yet (container just started).
    #[error("no precpu baseline (first sample)")]
    FirstSample,
    /// A key inside `cpu_stats` is absent.
    #[error("snapshot is missing {0}")]
    MissingField(&'static str),
}

/// Round to two decimal places, exact ties to the even digit.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

pub fn bytes_to_megabytes(value: u64) -> f64 {
    round2(value as f64 / BYTES_PER_MEGABYTE)
}

/// CPU usage since the previous sample, scaled by the `percpu_usage` core count.
///
/// A snapshot without `percpu_usage` (cgroup v2 hosts) has a core count of 0 and
/// therefore reports 0.0 whenever the deltas are positive.
pub fn cpu_percent(s: &ContainerStatsResponse) -> Result<f64, CpuFallback> {
    let precpu_stats = s.precpu_stats.as_ref().ok_or(CpuFallback::FirstSample)?;
    let precpu_usage = precpu_stats
        .cpu_usage
        .as_ref()
        .ok_or(CpuFallback::FirstSample)?;
    let pre_total = precpu_usage.total_usage.ok_or(CpuFallback::FirstSample)?;
    let pre_system = precpu_stats
        .system_cpu_usage
        .ok_or(CpuFallback::FirstSample)?;

    let cpu_stats = s
        .cpu_stats
        .as_ref()
        .ok_or(CpuFallback::MissingField("cpu_stats"))?;
    let cpu_usage = cpu_stats
        .cpu_usage
        .as_ref()
        .ok_or(CpuFallback::MissingField("cpu_stats.cpu_usage"))?;
    let total = cpu_usage
        .total_usage
        .ok_or(CpuFallback::MissingField("cpu_stats.cpu_usage.total_usage"))?;
    let system = cpu_stats
        .system_cpu_usage
        .ok_or(CpuFallback::MissingField("cpu_stats.system_cpu_usage"))?;

    // Widened so counters above i64::MAX cannot overflow the subtraction.
    let cpu_delta = i128::from(total) - i128::from(pre_total);
    let system_delta = i128::from(system) - i128::from(pre_system);
    if cpu_delta <= 0 || system_delta <= 0 {
        return Ok(0.0);
    }

    let cores = cpu_usage.percpu_usage.as_ref().map_or(0, Vec::len) as f64;
    Ok(round2((cpu_delta as f64 / system_delta as f64) * cores * 100.0))
}

/// Memory usage as a percentage of the limit; 0.0 when there is no usable limit.
pub fn memory_percent(usage: u64, limit: u64) -> f64 {
    if limit == 0 {
        return 0.0;
    }
    round2(usage as f64 / limit as f64 * 100.0)
}

/// Sum `(rx_bytes, tx_bytes)` over all interfaces.
pub fn aggregate_network_io(
    networks: Option<&HashMap<String, ContainerNetworkStats>>,
) -> (u64, u64) {
    networks.map_or((0, 0), |n| {
        n.values().fold((0u64, 0u64), |(rx, tx), v| {
            (
                rx.saturating_add(v.rx_bytes.unwrap_or(0)),
                tx.saturating_add(v.tx_bytes.unwrap_or(0)),
            )
        })
    })
}

/// Sum `(read, write)` bytes from `io_service_bytes_recursive`. Ops other than
/// read/write (e.g. "Sync", "Total") are ignored.
pub fn aggregate_block_io(entries: Option<&[ContainerBlkioStatEntry]>) -> (u64, u64) {
    let mut read = 0u64;
    let mut write = 0u64;
    for e in entries.unwrap_or_default() {
        let value = e.value.unwrap_or(0);
        match e.op.as_deref() {
            Some(op) if op.eq_ignore_ascii_case("read") => read = read.saturating_add(value),
            Some(op) if op.eq_ignore_ascii_case("write") => write = write.saturating_add(value),
            _ => {}
        }
    }
    (read, write)
}
