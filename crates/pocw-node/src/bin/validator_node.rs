//! Validator process entry point. Each instance runs exactly one
//! [`shared_types::entities::ValidatorRole`]; a deployment with all three
//! roles runs three of these, addressed individually by the miner's
//! `VALIDATOR_ENDPOINTS` configuration.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use pocw_node::config::ValidatorConfig;
use pocw_signing::Signer256;
use pocw_validator::{MinerKeyStore, TwitterQualityPlugin, ValidatorService};
use pocw_verifiers::{CreationVerifier, RetweetVerifier, VerifierRegistry};
use pocw_vlc::ValidatorVlcService;
use shared_types::entities::TaskType;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ValidatorConfig::from_env().context("loading validator configuration")?;

    let _telemetry =
        pocw_telemetry::init_telemetry(pocw_telemetry::TelemetryConfig::for_service("pocw-validator"))
            .context("initializing telemetry")?;

    info!(
        validator_id = config.validator_id,
        role = ?config.role,
        weight = config.weight,
        "starting pocw validator node"
    );

    let signer = Arc::new(
        Signer256::from_hex(&config.private_key_hex).context("parsing VALIDATOR_PRIVATE_KEY")?,
    );

    let miner_keys =
        MinerKeyStore::from_hex_map(&config.miner_public_keys).context("parsing MINER_PUBLIC_KEYS")?;

    // Payload shape checks only; the validator never calls the external
    // middleware, so retweet and batch verifiers are registered
    // key-less/client-less placeholders that only exercise
    // `validate_payload`.
    let mut verifiers = VerifierRegistry::new();
    verifiers.register(TaskType::Creation, Arc::new(CreationVerifier::new()));
    let middleware = pocw_verifiers::MiddlewareClient::new("", "", std::time::Duration::from_secs(1));
    verifiers.register(TaskType::Retweet, Arc::new(RetweetVerifier::new(middleware.clone())));
    verifiers.register(TaskType::Batch, Arc::new(pocw_verifiers::BatchVerifier::new(middleware)));
    let verifiers = Arc::new(verifiers);

    let vlc = ValidatorVlcService::new(config.validator_id);
    let quality = Arc::new(TwitterQualityPlugin::default());

    let service = Arc::new(ValidatorService::new(
        config.validator_id,
        config.role,
        config.weight,
        signer,
        miner_keys,
        vlc,
        verifiers,
        quality,
    ));

    let app = pocw_node::validator_http::router(Arc::clone(&service), config.validator_id, config.role);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("binding validator HTTP listener on {}", config.listen_addr))?;

    info!(addr = %config.listen_addr, "pocw validator node ready");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result.context("validator HTTP server exited")?;
        }
        ctrl_c = tokio::signal::ctrl_c() => {
            ctrl_c.context("waiting on ctrl-c")?;
            info!("shutting down");
        }
    }

    Ok(())
}
