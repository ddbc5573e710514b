//! Event types carried on the in-process miner event bus.
//!
//! These decouple the batch worker pool and the validator scheduler from the
//! task lifecycle engine: neither needs a direct reference to the other, they
//! only need to observe what happened.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Something the lifecycle engine or batch pool wants other components to
/// observe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MinerEvent {
    TaskSubmitted { task_id: Uuid },
    TaskVerified { task_id: Uuid },
    TaskFailed { task_id: Uuid, reason: String },
    BatchCompleted { task_id: Uuid, verified: usize, unverified: usize },
}
