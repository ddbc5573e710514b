//! Per-item verification used by the batch worker pool.
//!
//! Distinct from `pocw_verifiers::BatchVerifier`, which validates and
//! submits a whole batch payload synchronously. The pool needs to retry
//! and pace at the granularity of a single item, so that policy is
//! pulled out behind its own port — production wires it to the
//! middleware; tests substitute a deterministic function.

use async_trait::async_trait;
use serde_json::Value;
use shared_types::errors::PocwError;

use pocw_verifiers::BatchVerifier;

#[async_trait]
pub trait ItemVerifier: Send + Sync {
    async fn verify_item(&self, item: &Value) -> Result<bool, PocwError>;
}

/// Calls the middleware's bulk endpoint with a single-item batch.
pub struct MiddlewareItemVerifier {
    batch_verifier: BatchVerifier,
}

impl MiddlewareItemVerifier {
    pub fn new(batch_verifier: BatchVerifier) -> Self {
        Self { batch_verifier }
    }
}

#[async_trait]
impl ItemVerifier for MiddlewareItemVerifier {
    async fn verify_item(&self, item: &Value) -> Result<bool, PocwError> {
        let results = self.batch_verifier.verify_items(std::slice::from_ref(item)).await?;
        Ok(results.first().map(|r| r.verified).unwrap_or(false))
    }
}
