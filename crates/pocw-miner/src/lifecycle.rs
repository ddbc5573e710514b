//! The task lifecycle engine: submission, sync/async verification with
//! polling timeout, proof assembly, and validator fan-out.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use shared_bus::{EventBus, MinerEvent};
use shared_types::clock::VectorClockSnapshot;
use shared_types::entities::{MinerOutput, Task, TaskProof, TaskStatus, TaskType};
use shared_types::errors::PocwError;
use uuid::Uuid;

use pocw_signing::Signer256;
use pocw_telemetry::{TASKS_FAILED, TASKS_SUBMITTED, TASKS_VERIFIED};
use pocw_validator_client::{FanoutOutcome, ValidatorClient};
use pocw_verifiers::{SyncVerification, VerifierRegistry};
use pocw_vlc::{Stage, VlcService};

use crate::batch_pool::BatchPool;
use crate::store::TaskStore;

/// How often an async watch is polled.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);
/// Wall-clock budget for async verification before a task is failed.
pub const ASYNC_DEADLINE: Duration = Duration::from_secs(10 * 60);

pub struct SubmitTaskRequest {
    pub user_wallet: String,
    pub task_type: TaskType,
    pub payload: Value,
}

pub struct SubmitTaskResponse {
    pub success: bool,
    pub task_id: Uuid,
    /// Populated only for creation tasks, which advance the clock at
    /// submission time.
    pub vlc_value: Option<u64>,
}

pub struct LifecycleEngine {
    store: Arc<dyn TaskStore>,
    verifiers: Arc<VerifierRegistry>,
    vlc: Arc<VlcService>,
    signer: Arc<Signer256>,
    miner_id: u32,
    validator_client: Arc<ValidatorClient>,
    events: Arc<EventBus>,
    batch_pool: Arc<BatchPool>,
}

impl LifecycleEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn TaskStore>,
        verifiers: Arc<VerifierRegistry>,
        vlc: Arc<VlcService>,
        signer: Arc<Signer256>,
        miner_id: u32,
        validator_client: Arc<ValidatorClient>,
        events: Arc<EventBus>,
        batch_pool: Arc<BatchPool>,
    ) -> Self {
        Self {
            store,
            verifiers,
            vlc,
            signer,
            miner_id,
            validator_client,
            events,
            batch_pool,
        }
    }

    /// `submitTask`: resolves the verifier, validates the payload,
    /// persists a new task, and spawns the worker that drives it through
    /// verification. Returns immediately — the caller does not wait for
    /// verification to complete.
    pub async fn submit_task(
        self: &Arc<Self>,
        req: SubmitTaskRequest,
    ) -> Result<SubmitTaskResponse, PocwError> {
        let verifier = self.verifiers.resolve(req.task_type)?;
        verifier.validate_payload(&req.payload)?;

        let task_id = Uuid::new_v4();
        let submission_vlc = self
            .vlc
            .increment_for_task(task_id, req.task_type, Stage::Submission, 0);

        let mut task = Task::new(req.user_wallet, req.task_type, req.payload, submission_vlc.clone());
        task.id = task_id;

        self.store.insert(task).await?;
        TASKS_SUBMITTED.with_label_values(&[req.task_type.as_str()]).inc();
        self.events.publish(MinerEvent::TaskSubmitted { task_id });

        // Batch tasks get the dedicated worker pool (sub-batching, per-item
        // retry, rate-limit pacing); everything else runs the generic
        // sync/async verifier path inline.
        if req.task_type == TaskType::Batch {
            self.batch_pool.submit(task_id)?;
        } else {
            let engine = Arc::clone(self);
            tokio::spawn(async move {
                if let Err(e) = engine.process_async(task_id).await {
                    tracing::warn!(task_id = %task_id, error = %e, "task processing failed");
                }
            });
        }

        let vlc_value = matches!(req.task_type, TaskType::Creation).then(|| submission_vlc.get(1));

        Ok(SubmitTaskResponse {
            success: true,
            task_id,
            vlc_value,
        })
    }

    /// `processAsync`: runs the synchronous verifier; on `Pending`,
    /// registers an async watch and polls it until completion or the
    /// deadline elapses.
    pub async fn process_async(&self, task_id: Uuid) -> Result<(), PocwError> {
        let task = self
            .store
            .get(task_id)
            .await?
            .ok_or_else(|| PocwError::Internal(format!("task {task_id} vanished")))?;

        let verifier = self.verifiers.resolve(task.task_type)?;

        match verifier.validate_sync(&task.payload).await {
            Ok(SyncVerification::Verified(proof)) => self.handle_verified(task_id, proof).await,
            Ok(SyncVerification::Pending) => {
                self.store
                    .transition(task_id, TaskStatus::Submitted, TaskStatus::PendingVerification)
                    .await?;

                if !verifier.supports_async() {
                    return self.fail_task(task_id, "verifier has no async path for a pending result").await;
                }

                let watch_id = match verifier.register_async_watch(&task.payload).await {
                    Ok(id) => id,
                    Err(e) => return self.fail_task(task_id, &e.to_string()).await,
                };

                self.poll_until_complete(task_id, watch_id.as_str()).await
            }
            Err(e) => self.fail_task(task_id, &e.to_string()).await,
        }
    }

    /// Resumes a task stuck in `pending_verification`, claiming it with a
    /// compare-and-set transition so a concurrent poll loop for the same
    /// task can't double-advance the clock. A no-op if the task has
    /// already moved on by the time the sweep gets to it.
    pub async fn retry_pending(&self, task_id: Uuid) -> Result<(), PocwError> {
        let claimed = self
            .store
            .transition(task_id, TaskStatus::PendingVerification, TaskStatus::Processing)
            .await?;
        if !claimed {
            return Ok(());
        }

        let task = self
            .store
            .get(task_id)
            .await?
            .ok_or_else(|| PocwError::Internal(format!("task {task_id} vanished")))?;
        let verifier = self.verifiers.resolve(task.task_type)?;

        match verifier.validate_sync(&task.payload).await {
            Ok(SyncVerification::Verified(proof)) => self.handle_verified(task_id, proof).await,
            Ok(SyncVerification::Pending) => {
                self.store
                    .transition(task_id, TaskStatus::Processing, TaskStatus::PendingVerification)
                    .await?;
                Ok(())
            }
            Err(e) => self.fail_task(task_id, &e.to_string()).await,
        }
    }

    async fn poll_until_complete(&self, task_id: Uuid, watch_id: &str) -> Result<(), PocwError> {
        let verifier = {
            let task = self
                .store
                .get(task_id)
                .await?
                .ok_or_else(|| PocwError::Internal(format!("task {task_id} vanished")))?;
            self.verifiers.resolve(task.task_type)?
        };

        let deadline = tokio::time::Instant::now() + ASYNC_DEADLINE;

        loop {
            if tokio::time::Instant::now() >= deadline {
                return self.fail_task(task_id, "async verification deadline elapsed").await;
            }

            tokio::time::sleep(POLL_INTERVAL).await;

            match verifier.check_async_status(watch_id).await {
                Ok(pocw_verifiers::AsyncStatus::Completed(proof)) => {
                    return self.handle_verified(task_id, proof).await
                }
                Ok(pocw_verifiers::AsyncStatus::Pending) => continue,
                // Poll errors are non-fatal; they don't consume extra
                // deadline budget beyond the tick that produced them.
                Err(e) => {
                    tracing::debug!(task_id = %task_id, error = %e, "poll error, retrying");
                    continue;
                }
            }
        }
    }

    /// `handleVerified`: advances the VLC, persists the verified proof,
    /// signs a `MinerOutput`, and fans it out to the validator set.
    async fn handle_verified(&self, task_id: Uuid, proof: TaskProof) -> Result<(), PocwError> {
        let mut task = self
            .store
            .get(task_id)
            .await?
            .ok_or_else(|| PocwError::Internal(format!("task {task_id} vanished")))?;

        let verified_count = verified_count_for(task.task_type, &proof);
        let vlc_clock = self
            .vlc
            .increment_for_task(task_id, task.task_type, Stage::Verification, verified_count);

        task.proof = Some(proof);
        task.vlc_clock = vlc_clock.clone();
        task.status = TaskStatus::Verified;
        task.updated_at = chrono::Utc::now();
        self.store.replace(task.clone()).await?;
        TASKS_VERIFIED.with_label_values(&[task.task_type.as_str()]).inc();
        self.events.publish(MinerEvent::TaskVerified { task_id });

        let now = chrono::Utc::now();
        let event_id = task.derive_event_id(now.timestamp());

        let signature = pocw_signing::sign_miner_output(
            &self.signer,
            task_id,
            self.miner_id,
            &event_id,
            &vlc_clock,
            now.timestamp(),
        )
        .map_err(|e| PocwError::Internal(e.to_string()))?;

        let output = MinerOutput {
            task_id,
            task_type: task.task_type,
            miner_id: self.miner_id,
            event_id: event_id.clone(),
            vlc_clock,
            payload: task.payload.clone(),
            proof: task.proof.clone().expect("proof set above"),
            timestamp: now,
            signature,
        };

        task.event_id = Some(event_id);

        match self.validator_client.send_miner_output(&output).await {
            Ok(FanoutOutcome::LocalConsensus(_)) | Ok(FanoutOutcome::ForwardedToAggregator { .. }) => {
                task.status = TaskStatus::MinerOutputCreated;
                task.completed_at = Some(now);
                self.store.replace(task).await?;
                Ok(())
            }
            Err(e) => {
                TASKS_FAILED.with_label_values(&[task.task_type.as_str()]).inc();
                task.status = TaskStatus::Failed;
                self.store.replace(task).await?;
                self.events.publish(MinerEvent::TaskFailed {
                    task_id,
                    reason: e.to_string(),
                });
                Err(PocwError::Internal(e.to_string()))
            }
        }
    }

    async fn fail_task(&self, task_id: Uuid, reason: &str) -> Result<(), PocwError> {
        if let Some(mut task) = self.store.get(task_id).await? {
            TASKS_FAILED.with_label_values(&[task.task_type.as_str()]).inc();
            task.status = TaskStatus::Failed;
            task.updated_at = chrono::Utc::now();
            self.store.replace(task).await?;
        }
        self.events.publish(MinerEvent::TaskFailed {
            task_id,
            reason: reason.to_string(),
        });
        Err(PocwError::validation(reason.to_string()))
    }
}

/// How many clock increments a verified event earns, for the task types
/// whose strategy reads a count (only batch does; the others ignore it).
fn verified_count_for(task_type: TaskType, proof: &TaskProof) -> usize {
    if task_type != TaskType::Batch {
        return 0;
    }
    proof
        .evidence
        .get("verified")
        .and_then(Value::as_u64)
        .unwrap_or(0) as usize
}
