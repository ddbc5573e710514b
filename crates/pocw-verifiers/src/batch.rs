//! Batch verifier plugin: validates the batch submission shape and calls
//! the middleware's bulk endpoint. Does not support async watches — the
//! bounded worker pool in the miner crate handles pacing and retry around
//! this plugin.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use shared_types::entities::TaskProof;
use shared_types::errors::PocwError;

use crate::middleware::MiddlewareClient;
use crate::port::{SyncVerification, VerifierPlugin};

#[derive(Deserialize)]
struct BatchVerifyResponse {
    success: bool,
    results: Vec<BatchItemResult>,
}

#[derive(Deserialize, Clone)]
pub struct BatchItemResult {
    pub tweet_id: String,
    pub twitter_id: String,
    pub verified: bool,
}

pub struct BatchVerifier {
    client: MiddlewareClient,
}

impl BatchVerifier {
    pub fn new(client: MiddlewareClient) -> Self {
        Self { client }
    }

    fn validate(payload: &Value) -> Result<(), PocwError> {
        let start = payload
            .get("start_time")
            .and_then(Value::as_str)
            .ok_or_else(|| PocwError::validation("missing start_time"))?;
        let end = payload
            .get("end_time")
            .and_then(Value::as_str)
            .ok_or_else(|| PocwError::validation("missing end_time"))?;

        let start: DateTime<Utc> = start
            .parse()
            .map_err(|_| PocwError::validation("start_time is not RFC 3339"))?;
        let end: DateTime<Utc> = end
            .parse()
            .map_err(|_| PocwError::validation("end_time is not RFC 3339"))?;
        if end <= start {
            return Err(PocwError::validation("end_time must be after start_time"));
        }

        let tasks = payload
            .get("tasks")
            .and_then(Value::as_array)
            .ok_or_else(|| PocwError::validation("missing tasks array"))?;
        if tasks.is_empty() || tasks.len() > 100 {
            return Err(PocwError::validation("tasks length must be within [1, 100]"));
        }

        for (i, task) in tasks.iter().enumerate() {
            if task.get("tweet_id").and_then(Value::as_str).unwrap_or("").is_empty() {
                return Err(PocwError::validation(format!("task[{i}] missing tweet_id")));
            }
            if task.get("twitter_id").and_then(Value::as_str).unwrap_or("").is_empty() {
                return Err(PocwError::validation(format!("task[{i}] missing twitter_id")));
            }
        }

        Ok(())
    }

    /// Calls the middleware's bulk endpoint and returns per-item results.
    /// Exposed directly (not just through `validate_sync`) because the
    /// worker pool drives items in sub-batches of 10, not the whole batch
    /// at once.
    pub async fn verify_items(&self, items: &[Value]) -> Result<Vec<BatchItemResult>, PocwError> {
        let body = json!({ "tasks": items });
        let response: BatchVerifyResponse = self.client.post_json("/batch-verify", &body).await?;

        if !response.success {
            return Err(PocwError::PermanentUpstream("batch-verify call unsuccessful".into()));
        }

        Ok(response.results)
    }
}

#[async_trait]
impl VerifierPlugin for BatchVerifier {
    fn validate_payload(&self, payload: &Value) -> Result<(), PocwError> {
        Self::validate(payload)
    }

    async fn validate_sync(&self, payload: &Value) -> Result<SyncVerification, PocwError> {
        Self::validate(payload)?;

        let tasks = payload.get("tasks").and_then(Value::as_array).cloned().unwrap_or_default();
        let results = self.verify_items(&tasks).await?;

        let verified = results.iter().filter(|r| r.verified).count();
        let evidence = json!({
            "total": results.len(),
            "verified": verified,
            "unverified": results.len() - verified,
            "items": results.iter().map(|r| json!({
                "tweet_id": r.tweet_id,
                "twitter_id": r.twitter_id,
                "verified": r.verified,
            })).collect::<Vec<_>>(),
        });

        let proof = TaskProof {
            provider: "twitter-middleware-batch".to_string(),
            verified_at: chrono::Utc::now(),
            evidence,
            verification_id: None,
            signature: None,
        };

        Ok(SyncVerification::Verified(proof))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_out_of_range_task_count() {
        let payload = json!({
            "start_time": "2026-01-01T00:00:00Z",
            "end_time": "2026-01-02T00:00:00Z",
            "tasks": [],
        });
        assert!(BatchVerifier::validate(&payload).is_err());
    }

    #[test]
    fn rejects_end_before_start() {
        let payload = json!({
            "start_time": "2026-01-02T00:00:00Z",
            "end_time": "2026-01-01T00:00:00Z",
            "tasks": [{"tweet_id": "1234567890", "twitter_id": "abc"}],
        });
        assert!(BatchVerifier::validate(&payload).is_err());
    }

    #[test]
    fn accepts_well_formed_batch() {
        let payload = json!({
            "start_time": "2026-01-01T00:00:00Z",
            "end_time": "2026-01-02T00:00:00Z",
            "tasks": [{"tweet_id": "1234567890", "twitter_id": "abc"}],
        });
        assert!(BatchVerifier::validate(&payload).is_ok());
    }
}
