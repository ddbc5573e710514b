//! Periodic sweep that catches tasks the primary path left behind: a
//! batch submission that never reached the pool, or a pending
//! verification whose watch was never registered or went stale.

use std::sync::Arc;
use std::time::Duration;

use shared_types::entities::{TaskStatus, TaskType};
use tokio::task::JoinHandle;

use crate::batch_pool::BatchPool;
use crate::cancellation::CancelToken;
use crate::lifecycle::LifecycleEngine;
use crate::store::TaskStore;

pub const SWEEP_INTERVAL: Duration = Duration::from_secs(30);
pub const SWEEP_BATCH_LIMIT: usize = 50;

pub struct Scheduler {
    cancel: CancelToken,
    handle: JoinHandle<()>,
}

impl Scheduler {
    pub fn start(store: Arc<dyn TaskStore>, lifecycle: Arc<LifecycleEngine>, batch_pool: Arc<BatchPool>) -> Self {
        let cancel = CancelToken::new();
        let loop_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            while !loop_cancel.is_cancelled() {
                sweep(&store, &lifecycle, &batch_pool).await;
                tokio::time::sleep(SWEEP_INTERVAL).await;
            }
        });

        Self { cancel, handle }
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

async fn sweep(store: &Arc<dyn TaskStore>, lifecycle: &Arc<LifecycleEngine>, batch_pool: &Arc<BatchPool>) {
    for task_type in [TaskType::Creation, TaskType::Retweet] {
        let stuck = match store
            .list_by_status(task_type, TaskStatus::PendingVerification, SWEEP_BATCH_LIMIT)
            .await
        {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::warn!(?task_type, error = %e, "sweep: failed to list pending tasks");
                continue;
            }
        };

        for task in stuck {
            if let Err(e) = lifecycle.retry_pending(task.id).await {
                tracing::debug!(task_id = %task.id, error = %e, "sweep: pending retry did not complete");
            }
        }
    }

    let unsubmitted = match store
        .list_by_status(TaskType::Batch, TaskStatus::Submitted, SWEEP_BATCH_LIMIT)
        .await
    {
        Ok(tasks) => tasks,
        Err(e) => {
            tracing::warn!(error = %e, "sweep: failed to list unprocessed batch tasks");
            return;
        }
    };

    for task in unsubmitted {
        // The pool's own compare-and-set claim makes a duplicate submit
        // harmless; a full queue just means it's retried next sweep.
        if let Err(e) = batch_pool.submit(task.id) {
            tracing::debug!(task_id = %task.id, error = %e, "sweep: batch resubmit rejected, will retry");
        }
    }
}
