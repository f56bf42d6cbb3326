//! Metrics collector for the control plane
//!
//! Counters are recorded through the `metrics` facade; without an installed
//! recorder every call is a no-op, which is what the test suites rely on.

use anyhow::{Context, Result};
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct MetricsCollector;

impl MetricsCollector {
    pub fn new() -> Self {
        Self
    }

    /// Record one outbound operation call
    pub fn record_dispatch(&self, operation: &str, outcome: &str) {
        counter!(
            "fleetctl_dispatch_total",
            "operation" => operation.to_string(),
            "outcome" => outcome.to_string()
        )
        .increment(1);

        debug!(operation, outcome, "dispatch recorded");
    }

    /// Record one refresh cycle tick
    pub fn record_refresh_tick(&self, outcome: &str) {
        counter!("fleetctl_refresh_ticks_total", "outcome" => outcome.to_string()).increment(1);
    }

    /// Record one release handover run
    pub fn record_handover(&self, outcome: &str) {
        counter!("fleetctl_handover_total", "outcome" => outcome.to_string()).increment(1);
    }
}

/// Install the global Prometheus recorder and return the handle used to render it
pub fn install_prometheus_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("安装Prometheus指标记录器失败")?;

    info!("Prometheus metrics recorder installed");
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let metrics = MetricsCollector::new();
        metrics.record_dispatch("/v1/relay-server-replacement", "success");
        metrics.record_refresh_tick("failure");
        metrics.record_handover("completed");
    }
}
