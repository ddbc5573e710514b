//! Prometheus metrics for PoCW miner and validator nodes.
//!
//! Naming convention: `pocw_<subsystem>_<metric>_<unit>`.

use crate::TelemetryError;
use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Task lifecycle (C5)
    pub static ref TASKS_SUBMITTED: CounterVec = CounterVec::new(
        Opts::new("pocw_miner_tasks_submitted_total", "Tasks submitted by type"),
        &["task_type"]
    ).expect("metric creation failed");

    pub static ref TASKS_VERIFIED: CounterVec = CounterVec::new(
        Opts::new("pocw_miner_tasks_verified_total", "Tasks that reached verified status"),
        &["task_type"]
    ).expect("metric creation failed");

    pub static ref TASKS_FAILED: CounterVec = CounterVec::new(
        Opts::new("pocw_miner_tasks_failed_total", "Tasks that reached failed status"),
        &["task_type"]
    ).expect("metric creation failed");

    // Batch pool (C6)
    pub static ref BATCH_QUEUE_DEPTH: Gauge = Gauge::new(
        "pocw_miner_batch_queue_depth", "Number of batch tasks currently queued"
    ).expect("metric creation failed");

    pub static ref BATCH_ITEMS_VERIFIED: Counter = Counter::new(
        "pocw_miner_batch_items_verified_total", "Individual batch items verified"
    ).expect("metric creation failed");

    // VLC (C1-C3)
    pub static ref VLC_INCREMENTS: CounterVec = CounterVec::new(
        Opts::new("pocw_vlc_increments_total", "Vector clock increments by task type and stage"),
        &["task_type", "stage"]
    ).expect("metric creation failed");

    // Validator (C9-C10)
    pub static ref VOTES_CAST: CounterVec = CounterVec::new(
        Opts::new("pocw_validator_votes_cast_total", "Votes cast by role and decision"),
        &["role", "vote"]
    ).expect("metric creation failed");

    pub static ref REPLAY_REJECTIONS: Counter = Counter::new(
        "pocw_validator_replay_rejections_total", "Requests rejected as replays"
    ).expect("metric creation failed");

    pub static ref CONSENSUS_DECISIONS: CounterVec = CounterVec::new(
        Opts::new("pocw_consensus_decisions_total", "Local consensus outcomes"),
        &["decision"]
    ).expect("metric creation failed");
}

/// Handle for the metrics registry. Keep alive for the life of the process.
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry. Call once at startup.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(TASKS_SUBMITTED.clone()),
        Box::new(TASKS_VERIFIED.clone()),
        Box::new(TASKS_FAILED.clone()),
        Box::new(BATCH_QUEUE_DEPTH.clone()),
        Box::new(BATCH_ITEMS_VERIFIED.clone()),
        Box::new(VLC_INCREMENTS.clone()),
        Box::new(VOTES_CAST.clone()),
        Box::new(REPLAY_REJECTIONS.clone()),
        Box::new(CONSENSUS_DECISIONS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format, for a `/metrics` endpoint.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_increments() {
        TASKS_SUBMITTED.with_label_values(&["creation"]).inc();
        assert!(TASKS_SUBMITTED.with_label_values(&["creation"]).get() >= 1.0);
    }

    #[test]
    fn gauge_set() {
        BATCH_QUEUE_DEPTH.set(42.0);
        assert_eq!(BATCH_QUEUE_DEPTH.get(), 42.0);
    }
}
