//! Miner process entry point: loads configuration, wires the lifecycle
//! engine, batch pool, and catch-up scheduler together, then runs until
//! interrupted.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use pocw_miner::{
    BatchPool, HttpPointsClient, InMemoryTaskStore, LifecycleEngine, MiddlewareItemVerifier,
    Scheduler,
};
use pocw_node::config::MinerConfig;
use pocw_signing::Signer256;
use pocw_validator_client::{ValidatorClient, ValidatorClientConfig, ValidatorEndpoint};
use pocw_verifiers::{BatchVerifier, CreationVerifier, MiddlewareClient, RetweetVerifier, VerifierRegistry};
use pocw_vlc::VlcService;
use shared_bus::EventBus;
use shared_types::entities::TaskType;

const MINER_VLC_PROCESS_ID: u32 = 1;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = MinerConfig::from_env().context("loading miner configuration")?;

    let _telemetry = pocw_telemetry::init_telemetry(pocw_telemetry::TelemetryConfig::for_service("pocw-miner"))
        .context("initializing telemetry")?;

    info!(miner_id = config.miner_id, database_url = %config.database_url, "starting pocw miner node");

    let signer = Arc::new(
        Signer256::from_hex(&config.private_key_hex).context("parsing MINER_PRIVATE_KEY")?,
    );

    let middleware = MiddlewareClient::new(
        config.twitter_middleware_url.clone(),
        config.twitter_api_key.clone(),
        config.middleware_timeout(),
    );

    let mut verifiers = VerifierRegistry::new();
    verifiers.register(TaskType::Creation, Arc::new(CreationVerifier::new()));
    verifiers.register(TaskType::Retweet, Arc::new(RetweetVerifier::new(middleware.clone())));
    verifiers.register(TaskType::Batch, Arc::new(BatchVerifier::new(middleware.clone())));
    let verifiers = Arc::new(verifiers);

    let store: Arc<dyn pocw_miner::TaskStore> = Arc::new(InMemoryTaskStore::new());
    let vlc = VlcService::new(MINER_VLC_PROCESS_ID);
    let events = Arc::new(EventBus::new());

    let validator_endpoints = config
        .validator_endpoints
        .iter()
        .map(|e| ValidatorEndpoint {
            url: e.url.clone(),
            weight: e.weight,
            role: e.role,
        })
        .collect();

    let validator_client = Arc::new(ValidatorClient::new(ValidatorClientConfig {
        miner_id: config.miner_id,
        endpoints: validator_endpoints,
        aggregator_url: config.aggregator_url.clone(),
        max_retries: 3,
        retry_interval: std::time::Duration::from_secs(2),
        request_timeout: std::time::Duration::from_secs(10),
    }));

    let item_verifier = Arc::new(MiddlewareItemVerifier::new(BatchVerifier::new(middleware)));
    let points_client: Option<Arc<dyn pocw_miner::PointsClient>> = config
        .points_service_url
        .as_ref()
        .map(|url| Arc::new(HttpPointsClient::new(url.clone())) as Arc<dyn pocw_miner::PointsClient>);

    let batch_pool = Arc::new(BatchPool::start(
        Arc::clone(&store),
        item_verifier,
        Arc::clone(&vlc),
        points_client,
    ));

    let lifecycle = Arc::new(LifecycleEngine::new(
        Arc::clone(&store),
        Arc::clone(&verifiers),
        Arc::clone(&vlc),
        Arc::clone(&signer),
        config.miner_id,
        Arc::clone(&validator_client),
        Arc::clone(&events),
        Arc::clone(&batch_pool),
    ));

    let _scheduler = Scheduler::start(store, Arc::clone(&lifecycle), Arc::clone(&batch_pool));

    info!("pocw miner node ready");
    tokio::signal::ctrl_c().await.context("waiting on ctrl-c")?;
    info!("shutting down");

    batch_pool.stop();
    Ok(())
}
