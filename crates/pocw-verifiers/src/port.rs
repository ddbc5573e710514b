//! The verifier plugin contract every task type implements.

use async_trait::async_trait;
use serde_json::Value;
use shared_types::entities::TaskProof;
use shared_types::errors::PocwError;

/// Outcome of a synchronous verification attempt.
pub enum SyncVerification {
    /// The task was confirmed; carries the attached proof.
    Verified(TaskProof),
    /// Not yet confirmed — not an error, the caller should poll.
    Pending,
}

/// Outcome of polling an async watch.
pub enum AsyncStatus {
    Completed(TaskProof),
    Pending,
}

/// A task-type-specific verification strategy.
///
/// Plugins are stateless with respect to individual tasks; any per-call
/// state (watch ids) is threaded through by the caller.
#[async_trait]
pub trait VerifierPlugin: Send + Sync {
    /// Structural check of the payload shape. Returns the failure reason.
    fn validate_payload(&self, payload: &Value) -> Result<(), PocwError>;

    /// Attempts synchronous verification. `Pending` means "not yet
    /// confirmed, poll later" and is distinct from an error.
    async fn validate_sync(&self, payload: &Value) -> Result<SyncVerification, PocwError>;

    /// Registers an asynchronous watch with the upstream verifier. Plugins
    /// that only support synchronous verification return `Unsupported`.
    async fn register_async_watch(&self, _payload: &Value) -> Result<String, PocwError> {
        Err(PocwError::Internal("async watch unsupported".into()))
    }

    /// Polls a previously registered watch.
    async fn check_async_status(&self, _watch_id: &str) -> Result<AsyncStatus, PocwError> {
        Err(PocwError::Internal("async watch unsupported".into()))
    }

    fn supports_async(&self) -> bool {
        false
    }
}
