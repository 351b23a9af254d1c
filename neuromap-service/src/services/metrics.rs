//! Metrics collection and Prometheus export.
//!
//! Initializes the metrics exporter and provides the /metrics endpoint body.
//! Recording before `init_metrics` is a no-op, so tests need no setup.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Subsequent calls are no-ops.
pub fn init_metrics() -> Result<(), BuildError> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

pub fn record_model_call(use_case: &'static str, result: &'static str, elapsed: Duration) {
    counter!("neuromap_model_calls_total", "use_case" => use_case, "result" => result)
        .increment(1);
    histogram!("neuromap_model_call_duration_seconds", "use_case" => use_case)
        .record(elapsed.as_secs_f64());
}

pub fn record_extraction(use_case: &'static str, outcome: &'static str) {
    counter!("neuromap_extractions_total", "use_case" => use_case, "outcome" => outcome)
        .increment(1);
}
