//! Bounded worker pool that drains batch verification tasks: chunks each
//! batch into sub-batches, retries individual items, paces sub-batches to
//! respect upstream rate limits, and dispatches points on completion.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use shared_types::entities::{TaskProof, TaskStatus, TaskType};
use shared_types::errors::PocwError;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use pocw_telemetry::{BATCH_ITEMS_VERIFIED, BATCH_QUEUE_DEPTH};
use pocw_vlc::{Stage, VlcService};

use crate::cancellation::CancelToken;
use crate::item_verifier::ItemVerifier;
use crate::points::PointsClient;
use crate::store::TaskStore;

pub const NUM_WORKERS: usize = 5;
pub const QUEUE_CAPACITY: usize = 1000;
pub const SUB_BATCH_SIZE: usize = 10;
pub const MAX_ITEM_ATTEMPTS: u32 = 3;
const RATE_LIMIT_PAUSE: Duration = Duration::from_secs(1);

pub struct BatchPool {
    sender: mpsc::Sender<Uuid>,
    cancel: CancelToken,
    workers: Vec<JoinHandle<()>>,
    queued: Arc<AtomicUsize>,
}

struct WorkerContext {
    store: Arc<dyn TaskStore>,
    item_verifier: Arc<dyn ItemVerifier>,
    vlc: Arc<VlcService>,
    points_client: Option<Arc<dyn PointsClient>>,
}

impl BatchPool {
    pub fn start(
        store: Arc<dyn TaskStore>,
        item_verifier: Arc<dyn ItemVerifier>,
        vlc: Arc<VlcService>,
        points_client: Option<Arc<dyn PointsClient>>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        let receiver = Arc::new(Mutex::new(receiver));
        let cancel = CancelToken::new();
        let queued = Arc::new(AtomicUsize::new(0));

        let context = Arc::new(WorkerContext {
            store,
            item_verifier,
            vlc,
            points_client,
        });

        let workers = (0..NUM_WORKERS)
            .map(|_| {
                let receiver = Arc::clone(&receiver);
                let context = Arc::clone(&context);
                let cancel = cancel.clone();
                let queued = Arc::clone(&queued);
                tokio::spawn(async move { worker_loop(receiver, context, cancel, queued).await })
            })
            .collect();

        Self {
            sender,
            cancel,
            workers,
            queued,
        }
    }

    /// Marks `task_id` `processing` and enqueues it. Rejects with a
    /// non-retryable error when the queue is full — the caller must
    /// retry on its own schedule.
    pub fn submit(&self, task_id: Uuid) -> Result<(), PocwError> {
        self.sender
            .try_send(task_id)
            .map_err(|_| PocwError::Internal("batch queue is full".to_string()))?;
        self.queued.fetch_add(1, Ordering::SeqCst);
        BATCH_QUEUE_DEPTH.set(self.queued.load(Ordering::SeqCst) as f64);
        Ok(())
    }

    /// Stops accepting new submissions and signals workers to drain their
    /// current item and exit.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub async fn join(self) {
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

async fn worker_loop(
    receiver: Arc<Mutex<mpsc::Receiver<Uuid>>>,
    context: Arc<WorkerContext>,
    cancel: CancelToken,
    queued: Arc<AtomicUsize>,
) {
    loop {
        if cancel.is_cancelled() {
            return;
        }

        let task_id = {
            let mut guard = receiver.lock().await;
            guard.recv().await
        };

        let Some(task_id) = task_id else {
            return;
        };

        queued.fetch_sub(1, Ordering::SeqCst);
        BATCH_QUEUE_DEPTH.set(queued.load(Ordering::SeqCst) as f64);

        if let Err(e) = process_batch_task(&context, task_id, &cancel).await {
            tracing::warn!(task_id = %task_id, error = %e, "batch task processing failed");
        }
    }
}

async fn process_batch_task(
    context: &WorkerContext,
    task_id: Uuid,
    cancel: &CancelToken,
) -> Result<(), PocwError> {
    // Guarded transition: if the scheduler already claimed this task and
    // moved it on, skip rather than double-process.
    let claimed = context
        .store
        .transition(task_id, TaskStatus::Submitted, TaskStatus::Processing)
        .await?;
    if !claimed {
        return Ok(());
    }

    let task = context
        .store
        .get(task_id)
        .await?
        .ok_or_else(|| PocwError::Internal(format!("task {task_id} vanished")))?;

    let items: Vec<Value> = task
        .payload
        .get("tasks")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut verified = 0usize;
    let mut unverified = 0usize;

    for chunk in items.chunks(SUB_BATCH_SIZE) {
        for item in chunk {
            if cancel.is_cancelled() {
                break;
            }
            if verify_with_retry(context.item_verifier.as_ref(), item).await {
                verified += 1;
                BATCH_ITEMS_VERIFIED.inc();
            } else {
                unverified += 1;
            }
        }

        if cancel.is_cancelled() {
            break;
        }
        tokio::time::sleep(RATE_LIMIT_PAUSE).await;
    }

    let vlc_clock = context
        .vlc
        .increment_for_task(task_id, TaskType::Batch, Stage::Verification, verified);

    let mut task = task;
    task.proof = Some(TaskProof {
        provider: "batch-worker-pool".to_string(),
        verified_at: chrono::Utc::now(),
        evidence: json!({
            "total": items.len(),
            "verified": verified,
            "unverified": unverified,
            "vlc_increment": verified.min(10),
            "processed_at": chrono::Utc::now(),
        }),
        verification_id: None,
        signature: None,
    });
    task.vlc_clock = vlc_clock;
    task.status = TaskStatus::Verified;
    task.updated_at = chrono::Utc::now();
    context.store.replace(task.clone()).await?;

    if verified > 0 {
        if let Some(points_client) = &context.points_client {
            if let Err(e) = points_client
                .dispatch(&task_id.to_string(), "batch_verification", std::slice::from_ref(&task))
                .await
            {
                tracing::warn!(task_id = %task_id, error = %e, "points dispatch failed, task status unaffected");
            }
        }
    }

    Ok(())
}

async fn verify_with_retry(verifier: &dyn ItemVerifier, item: &Value) -> bool {
    for attempt in 1..=MAX_ITEM_ATTEMPTS {
        match verifier.verify_item(item).await {
            Ok(outcome) => return outcome,
            Err(PocwError::TransientUpstream(_)) if attempt < MAX_ITEM_ATTEMPTS => {
                tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
            }
            Err(_) => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTaskStore;
    use async_trait::async_trait;
    use serde_json::json;
    use shared_types::clock::VectorClockSnapshot;
    use shared_types::entities::Task;
    use std::sync::atomic::AtomicU32;

    struct DeterministicVerifier {
        fail_first_n: AtomicU32,
    }

    #[async_trait]
    impl ItemVerifier for DeterministicVerifier {
        async fn verify_item(&self, item: &Value) -> Result<bool, PocwError> {
            if self.fail_first_n.load(Ordering::SeqCst) > 0 {
                self.fail_first_n.fetch_sub(1, Ordering::SeqCst);
                return Err(PocwError::TransientUpstream("simulated".into()));
            }
            Ok(item.get("twitter_id").and_then(Value::as_str) != Some("bad"))
        }
    }

    fn batch_task(n: usize) -> Task {
        let tasks: Vec<Value> = (0..n)
            .map(|i| json!({"tweet_id": format!("{}", 1_000_000_000 + i), "twitter_id": "ok"}))
            .collect();
        let payload = json!({
            "start_time": "2026-01-01T00:00:00Z",
            "end_time": "2026-01-02T00:00:00Z",
            "tasks": tasks,
        });
        Task::new("wallet".to_string(), TaskType::Batch, payload, VectorClockSnapshot::empty(1))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn batch_of_twenty_five_clamps_vlc_to_ten() {
        let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());
        let task = batch_task(25);
        let task_id = task.id;
        store.insert(task).await.unwrap();

        let verifier: Arc<dyn ItemVerifier> = Arc::new(DeterministicVerifier {
            fail_first_n: AtomicU32::new(0),
        });
        let vlc = VlcService::new(1);

        let context = WorkerContext {
            store: Arc::clone(&store),
            item_verifier: verifier,
            vlc,
            points_client: None,
        };
        let cancel = CancelToken::new();

        process_batch_task(&context, task_id, &cancel).await.unwrap();

        let task = store.get(task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Verified);
        assert_eq!(task.vlc_clock.get(1), 10);
    }
}
