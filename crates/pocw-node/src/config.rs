//! Environment-variable configuration for the miner and validator
//! binaries. Every required variable is read once at startup; a missing
//! or malformed one fails the process immediately rather than falling
//! back to a guessed default.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use shared_types::entities::ValidatorRole;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("environment variable {0} is malformed: {1}")]
    Malformed(&'static str, String),
    #[error("VALIDATOR_ENDPOINTS weights sum to {0:.4}, must be within 0.01 of 1.0")]
    WeightsDoNotSum(f64),
    #[error("VALIDATOR_WEIGHT must be in (0, 1], got {0}")]
    WeightOutOfRange(f64),
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn require_u32(key: &'static str) -> Result<u32, ConfigError> {
    require(key)?.parse().map_err(|e| ConfigError::Malformed(key, format!("{e}")))
}

/// One entry of the `VALIDATOR_ENDPOINTS` JSON array the miner fans out to.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorEndpointSpec {
    pub url: String,
    pub weight: f64,
    pub role: ValidatorRole,
}

/// Configuration for the miner process.
pub struct MinerConfig {
    pub miner_id: u32,
    pub private_key_hex: String,
    pub validator_endpoints: Vec<ValidatorEndpointSpec>,
    pub aggregator_url: Option<String>,
    pub database_url: String,
    pub twitter_middleware_url: String,
    pub twitter_api_key: String,
    pub points_service_url: Option<String>,
}

impl MinerConfig {
    /// Loads and validates every required variable. Weight validation
    /// mirrors the fan-out client's own assumption that the configured
    /// weights already sum to one; catching a misconfigured network at
    /// startup is cheaper than debugging a skewed consensus later.
    pub fn from_env() -> Result<Self, ConfigError> {
        let miner_id = require_u32("MINER_ID")?;
        let private_key_hex = require("MINER_PRIVATE_KEY")?;
        let database_url = require("DATABASE_URL")?;
        let twitter_middleware_url = require("TWITTER_MIDDLE_LAYER_URL")?;
        let twitter_api_key = require("TWITTER_API_KEY")?;

        let endpoints_raw = require("VALIDATOR_ENDPOINTS")?;
        let validator_endpoints: Vec<ValidatorEndpointSpec> = serde_json::from_str(&endpoints_raw)
            .map_err(|e| ConfigError::Malformed("VALIDATOR_ENDPOINTS", e.to_string()))?;

        let weight_sum: f64 = validator_endpoints.iter().map(|e| e.weight).sum();
        if (weight_sum - 1.0).abs() > 0.01 {
            return Err(ConfigError::WeightsDoNotSum(weight_sum));
        }

        Ok(Self {
            miner_id,
            private_key_hex,
            validator_endpoints,
            aggregator_url: env::var("VALIDATOR_AGGREGATOR_URL").ok(),
            database_url,
            twitter_middleware_url,
            twitter_api_key,
            points_service_url: env::var("POINTS_SERVICE_URL").ok(),
        })
    }

    pub fn middleware_timeout(&self) -> Duration {
        env::var("TWITTER_MIDDLEWARE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10))
    }
}

/// Configuration for a single validator process. Each validator runs
/// exactly one role; a deployment with all three roles represented runs
/// three independent processes pointed at by the miner's
/// `VALIDATOR_ENDPOINTS`.
pub struct ValidatorConfig {
    pub validator_id: u32,
    pub role: ValidatorRole,
    pub weight: f64,
    pub private_key_hex: String,
    pub miner_public_keys: HashMap<u32, String>,
    pub listen_addr: String,
}

impl ValidatorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let validator_id = require_u32("VALIDATOR_ID")?;
        let role = parse_role(&require("VALIDATOR_ROLE")?)?;

        let weight: f64 = require("VALIDATOR_WEIGHT")?
            .parse()
            .map_err(|e| ConfigError::Malformed("VALIDATOR_WEIGHT", format!("{e}")))?;
        if !(weight > 0.0 && weight <= 1.0) {
            return Err(ConfigError::WeightOutOfRange(weight));
        }

        let private_key_hex = require("VALIDATOR_PRIVATE_KEY")?;

        let miner_public_keys = match env::var("MINER_PUBLIC_KEYS") {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| ConfigError::Malformed("MINER_PUBLIC_KEYS", e.to_string()))?,
            Err(_) => HashMap::new(),
        };

        let listen_addr = env::var("VALIDATOR_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Ok(Self {
            validator_id,
            role,
            weight,
            private_key_hex,
            miner_public_keys,
            listen_addr,
        })
    }
}

fn parse_role(raw: &str) -> Result<ValidatorRole, ConfigError> {
    match raw.to_lowercase().as_str() {
        "ui" => Ok(ValidatorRole::Ui),
        "format" => Ok(ValidatorRole::Format),
        "semantic" => Ok(ValidatorRole::Semantic),
        other => Err(ConfigError::Malformed("VALIDATOR_ROLE", format!("unknown role {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize tests that touch
    // them so they don't race each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_miner_vars() {
        for key in [
            "MINER_ID",
            "MINER_PRIVATE_KEY",
            "DATABASE_URL",
            "TWITTER_MIDDLE_LAYER_URL",
            "TWITTER_API_KEY",
            "VALIDATOR_ENDPOINTS",
            "VALIDATOR_AGGREGATOR_URL",
            "POINTS_SERVICE_URL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn missing_required_var_fails_hard() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_miner_vars();
        let result = MinerConfig::from_env();
        assert!(matches!(result, Err(ConfigError::Missing("MINER_ID"))));
    }

    #[test]
    fn weights_must_sum_to_one() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_miner_vars();
        env::set_var("MINER_ID", "1");
        env::set_var("MINER_PRIVATE_KEY", "aa");
        env::set_var("DATABASE_URL", "postgres://localhost/pocw");
        env::set_var("TWITTER_MIDDLE_LAYER_URL", "https://middleware.example");
        env::set_var("TWITTER_API_KEY", "key");
        env::set_var(
            "VALIDATOR_ENDPOINTS",
            r#"[{"url":"http://v1","weight":0.4,"role":"ui"},{"url":"http://v2","weight":0.4,"role":"format"}]"#,
        );

        let result = MinerConfig::from_env();
        assert!(matches!(result, Err(ConfigError::WeightsDoNotSum(_))));
        clear_miner_vars();
    }

    #[test]
    fn well_formed_miner_config_loads() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_miner_vars();
        env::set_var("MINER_ID", "1");
        env::set_var("MINER_PRIVATE_KEY", "aa");
        env::set_var("DATABASE_URL", "postgres://localhost/pocw");
        env::set_var("TWITTER_MIDDLE_LAYER_URL", "https://middleware.example");
        env::set_var("TWITTER_API_KEY", "key");
        env::set_var(
            "VALIDATOR_ENDPOINTS",
            r#"[{"url":"http://v1","weight":0.34,"role":"ui"},{"url":"http://v2","weight":0.33,"role":"format"},{"url":"http://v3","weight":0.33,"role":"semantic"}]"#,
        );

        let config = MinerConfig::from_env().unwrap();
        assert_eq!(config.miner_id, 1);
        assert_eq!(config.validator_endpoints.len(), 3);
        clear_miner_vars();
    }

    #[test]
    fn validator_weight_out_of_range_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        for key in ["VALIDATOR_ID", "VALIDATOR_ROLE", "VALIDATOR_WEIGHT", "VALIDATOR_PRIVATE_KEY"] {
            env::remove_var(key);
        }
        env::set_var("VALIDATOR_ID", "1");
        env::set_var("VALIDATOR_ROLE", "ui");
        env::set_var("VALIDATOR_WEIGHT", "0");
        env::set_var("VALIDATOR_PRIVATE_KEY", "aa");

        let result = ValidatorConfig::from_env();
        assert!(matches!(result, Err(ConfigError::WeightOutOfRange(_))));

        for key in ["VALIDATOR_ID", "VALIDATOR_ROLE", "VALIDATOR_WEIGHT", "VALIDATOR_PRIVATE_KEY"] {
            env::remove_var(key);
        }
    }
}
