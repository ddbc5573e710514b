//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for structured logging.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line (e.g. `pocw-miner`).
    pub service_name: String,
    /// Log level filter (trace, debug, info, warn, error).
    pub log_level: String,
    /// Whether to emit JSON-formatted logs (container deployments).
    pub json_logs: bool,
}

impl TelemetryConfig {
    pub fn for_service(service_name: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = service_name.to_string();
        config
    }

    /// Reads `POCW_LOG_LEVEL` (falling back to `RUST_LOG`) and
    /// `POCW_JSON_LOGS`.
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: "pocw-node".to_string(),
            log_level: env::var("POCW_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),
            json_logs: env::var("POCW_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_service_overrides_name() {
        let config = TelemetryConfig::for_service("pocw-validator");
        assert_eq!(config.service_name, "pocw-validator");
    }
}
