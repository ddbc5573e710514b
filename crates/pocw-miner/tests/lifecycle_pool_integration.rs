//! End-to-end test across the lifecycle engine, the batch worker pool,
//! and the event bus that decouples them.
//!
//! `LifecycleEngine::submit_task` is the single entry point a caller
//! uses; this test drives it directly for both a plain task and a
//! batch task and watches the bus for the events each path actually
//! produces, without reaching into either component's internals.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::OsRng;
use serde_json::{json, Value};
use tokio::time::timeout;

use pocw_miner::{BatchPool, InMemoryTaskStore, ItemVerifier, LifecycleEngine, Scheduler, SubmitTaskRequest, TaskStore};
use pocw_signing::Signer256;
use pocw_validator_client::{ValidatorClient, ValidatorClientConfig};
use pocw_verifiers::port::{SyncVerification, VerifierPlugin};
use pocw_verifiers::VerifierRegistry;
use pocw_vlc::VlcService;
use shared_bus::{EventBus, MinerEvent};
use shared_types::entities::{TaskProof, TaskStatus, TaskType};
use shared_types::errors::PocwError;

struct AlwaysVerified;

#[async_trait]
impl VerifierPlugin for AlwaysVerified {
    fn validate_payload(&self, _payload: &Value) -> Result<(), PocwError> {
        Ok(())
    }

    async fn validate_sync(&self, payload: &Value) -> Result<SyncVerification, PocwError> {
        Ok(SyncVerification::Verified(TaskProof {
            provider: "test".to_string(),
            verified_at: chrono::Utc::now(),
            evidence: payload.clone(),
            verification_id: None,
            signature: None,
        }))
    }
}

struct AcceptEveryItem;

#[async_trait]
impl ItemVerifier for AcceptEveryItem {
    async fn verify_item(&self, _item: &Value) -> Result<bool, PocwError> {
        Ok(true)
    }
}

async fn wait_for_status(store: &Arc<dyn TaskStore>, task_id: uuid::Uuid, target: TaskStatus) -> TaskStatus {
    for _ in 0..100 {
        let task = store.get(task_id).await.unwrap().unwrap();
        if task.status == target {
            return task.status;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    store.get(task_id).await.unwrap().unwrap().status
}

#[tokio::test(flavor = "multi_thread")]
async fn submit_task_drives_both_paths_and_the_bus_observes_both() {
    let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());

    let mut registry = VerifierRegistry::new();
    registry.register(TaskType::Creation, Arc::new(AlwaysVerified));
    registry.register(TaskType::Batch, Arc::new(AlwaysVerified));
    let verifiers = Arc::new(registry);

    let vlc = VlcService::new(1);
    let key = p256::ecdsa::SigningKey::random(&mut OsRng);
    let signer = Arc::new(Signer256::from_hex(&hex::encode(key.to_bytes())).unwrap());

    // No reachable validator endpoint: the creation task's fan-out is
    // expected to fail, which is itself the behavior under test for
    // that path (it must not silently hang).
    let validator_client = Arc::new(ValidatorClient::new(ValidatorClientConfig {
        miner_id: 1,
        endpoints: vec![],
        aggregator_url: None,
        max_retries: 0,
        retry_interval: Duration::from_millis(1),
        request_timeout: Duration::from_millis(50),
    }));

    let events = Arc::new(EventBus::new());
    let mut subscription = events.subscribe();

    let batch_pool = Arc::new(BatchPool::start(Arc::clone(&store), Arc::new(AcceptEveryItem), Arc::clone(&vlc), None));

    let lifecycle = Arc::new(LifecycleEngine::new(
        Arc::clone(&store),
        verifiers,
        Arc::clone(&vlc),
        signer,
        1,
        validator_client,
        Arc::clone(&events),
        Arc::clone(&batch_pool),
    ));

    let _scheduler = Scheduler::start(Arc::clone(&store), Arc::clone(&lifecycle), Arc::clone(&batch_pool));

    let creation = lifecycle
        .submit_task(SubmitTaskRequest {
            user_wallet: "wallet-1".to_string(),
            task_type: TaskType::Creation,
            payload: json!({}),
        })
        .await
        .unwrap();

    let batch = lifecycle
        .submit_task(SubmitTaskRequest {
            user_wallet: "wallet-2".to_string(),
            task_type: TaskType::Batch,
            payload: json!({
                "start_time": "2026-01-01T00:00:00Z",
                "end_time": "2026-01-02T00:00:00Z",
                "tasks": [
                    {"tweet_id": "3000000001", "twitter_id": "ok"},
                    {"tweet_id": "3000000002", "twitter_id": "ok"},
                ],
            }),
        })
        .await
        .unwrap();

    let mut submitted_seen = std::collections::HashSet::new();
    while submitted_seen.len() < 2 {
        match timeout(Duration::from_millis(500), subscription.recv()).await {
            Ok(Ok(MinerEvent::TaskSubmitted { task_id })) => {
                submitted_seen.insert(task_id);
            }
            Ok(Ok(_)) => continue,
            _ => break,
        }
    }
    assert!(submitted_seen.contains(&creation.task_id));
    assert!(submitted_seen.contains(&batch.task_id));

    // The batch task must be routed to the dedicated pool, not the
    // generic sync path the creation task takes.
    let batch_status = wait_for_status(&store, batch.task_id, TaskStatus::Verified).await;
    assert_eq!(batch_status, TaskStatus::Verified);
    let batch_task = store.get(batch.task_id).await.unwrap().unwrap();
    assert_eq!(batch_task.proof.unwrap().provider, "batch-worker-pool");

    let creation_status = wait_for_status(&store, creation.task_id, TaskStatus::Failed).await;
    assert_eq!(creation_status, TaskStatus::Failed, "fan-out with zero validators must fail, not hang");

    batch_pool.stop();
}
