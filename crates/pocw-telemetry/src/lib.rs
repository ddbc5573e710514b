//! # PoCW Telemetry
//!
//! Structured logging and Prometheus metrics shared by the miner and
//! validator binaries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pocw_telemetry::{TelemetryConfig, init_telemetry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = TelemetryConfig::for_service("pocw-miner");
//!     let _guard = init_telemetry(config).expect("failed to init telemetry");
//!     // application code runs with structured logs + a /metrics registry
//! }
//! ```

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::LoggingGuard;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, BATCH_ITEMS_VERIFIED, BATCH_QUEUE_DEPTH,
    CONSENSUS_DECISIONS, REPLAY_REJECTIONS, TASKS_FAILED, TASKS_SUBMITTED, TASKS_VERIFIED,
    VLC_INCREMENTS, VOTES_CAST,
};

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("failed to initialize metrics: {0}")]
    MetricsInit(String),
}

/// Initialize structured logging and the metrics registry for the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics_handle = register_metrics()?;
    let logging_guard = logging::init_logging(&config)?;

    Ok(TelemetryGuard {
        _logging: logging_guard,
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active. Drop to release resources.
pub struct TelemetryGuard {
    _logging: LoggingGuard,
    _metrics: MetricsHandle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_info() {
        let config = TelemetryConfig::for_service("pocw-miner");
        assert_eq!(config.service_name, "pocw-miner");
        assert_eq!(config.log_level, "info");
    }
}
