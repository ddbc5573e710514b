//! Core domain entities for the PoCW mining and validation pipeline.
//!
//! ## Clusters
//!
//! - **Task lifecycle**: `Task`, `TaskType`, `TaskStatus`, `TaskProof`
//! - **Attestation**: `MinerOutput`, `ValidatorVote`, `ConsensusResult`

use crate::clock::VectorClockSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The three task shapes the miner accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Creation,
    Retweet,
    Batch,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Creation => "creation",
            TaskType::Retweet => "retweet",
            TaskType::Batch => "batch",
        }
    }
}

/// States a task moves through from submission to miner-output fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Submitted,
    PendingVerification,
    Processing,
    Verified,
    MinerOutputCreated,
    Failed,
}

/// External attestation attached to a verified task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskProof {
    pub provider: String,
    pub verified_at: chrono::DateTime<chrono::Utc>,
    /// Open mapping; for batch tasks holds a list of per-item results.
    pub evidence: Value,
    pub verification_id: Option<String>,
    /// Opaque attestation handed back by the external middleware, if any.
    pub signature: Option<String>,
}

/// A single PoCW task as owned exclusively by the lifecycle engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_wallet: String,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub payload: Value,
    pub proof: Option<TaskProof>,
    pub vlc_clock: VectorClockSnapshot,
    pub event_id: Option<String>,
    pub attempts: u32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Task {
    pub fn new(user_wallet: String, task_type: TaskType, payload: Value, vlc_clock: VectorClockSnapshot) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_wallet,
            task_type,
            status: TaskStatus::Submitted,
            payload,
            proof: None,
            vlc_clock,
            event_id: None,
            attempts: 0,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Derives the event id a `MinerOutput` built from this task would carry.
    pub fn derive_event_id(&self, unix_seconds: i64) -> String {
        format!("task_{}_{}", self.id, unix_seconds)
    }
}

/// A signed statement by the miner that a task has been verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerOutput {
    pub task_id: Uuid,
    pub task_type: TaskType,
    pub miner_id: u32,
    pub event_id: String,
    pub vlc_clock: VectorClockSnapshot,
    pub payload: Value,
    pub proof: TaskProof,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Hex-encoded r||s ECDSA signature (see `pocw-signing`).
    pub signature: String,
}

/// The role a validator plays when dispatching a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorRole {
    Ui,
    Format,
    Semantic,
}

/// Accept/reject decision a single validator emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    Accept,
    Reject,
}

/// A single validator's signed response to a `MinerOutput`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorVote {
    pub event_id: String,
    pub validator_id: u32,
    pub validator_role: ValidatorRole,
    pub vote: Vote,
    /// In `[0, 1]`.
    pub score: f64,
    /// In `(0, 1]`.
    pub weight: f64,
    pub reason: String,
    pub vlc_state: VectorClockSnapshot,
    pub signature: String,
}

/// Aggregated outcome of a weighted vote over a `MinerOutput`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub event_id: String,
    pub votes: Vec<ValidatorVote>,
    pub total_weight: f64,
    pub accept_weight: f64,
    pub reject_weight: f64,
    pub final_decision: Vote,
    pub consensus_reached: bool,
}
