//! Wire message shapes exchanged between the Miner and Validator processes.

use crate::clock::VectorClockSnapshot;
use crate::entities::{TaskProof, TaskType, Vote};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The envelope the miner POSTs to `/api/v1/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerOutputRequest {
    #[serde(rename = "type")]
    pub message_type: String,
    pub message_id: Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub signature: String,
    pub task_id: Uuid,
    pub miner_id: u32,
    pub event_id: String,
    pub vlc_clock: VectorClockSnapshot,
    pub payload: Value,
    pub proof: TaskProof,
    pub request_id: Uuid,
    pub task_type: TaskType,
}

impl MinerOutputRequest {
    pub const MESSAGE_TYPE: &'static str = "miner_output";
}

/// A validator's signed reply to a `MinerOutputRequest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorVoteResponse {
    pub event_id: String,
    pub validator_id: u32,
    pub vote: Vote,
    pub score: f64,
    pub weight: f64,
    pub reason: String,
    pub vlc_state: VectorClockSnapshot,
    pub signature: String,
}

/// Body returned from `POST /api/v1/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub success: bool,
    pub vote: Option<ValidatorVoteResponse>,
    pub error: Option<String>,
}
