//! Retweet verifier: confirms a single retweet through the external
//! middleware, synchronously or via a registered watch.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use shared_types::entities::TaskProof;
use shared_types::errors::PocwError;

use crate::middleware::MiddlewareClient;
use crate::port::{AsyncStatus, SyncVerification, VerifierPlugin};

#[derive(Deserialize)]
struct VerifyRetweetResponse {
    success: bool,
    verified: bool,
    verification_id: Option<String>,
    evidence: Option<Value>,
}

#[derive(Deserialize)]
struct WatchStatusResponse {
    completed: bool,
    verified: bool,
    verification_id: Option<String>,
    evidence: Option<Value>,
}

pub struct RetweetVerifier {
    client: MiddlewareClient,
}

impl RetweetVerifier {
    pub fn new(client: MiddlewareClient) -> Self {
        Self { client }
    }

    fn validate(payload: &Value) -> Result<(), PocwError> {
        for field in ["tweet_id", "twitter_id"] {
            if payload.get(field).and_then(Value::as_str).unwrap_or("").is_empty() {
                return Err(PocwError::validation(format!("missing or empty field: {field}")));
            }
        }
        Ok(())
    }

    fn proof(provider: &str, verification_id: Option<String>, evidence: Value) -> TaskProof {
        TaskProof {
            provider: provider.to_string(),
            verified_at: chrono::Utc::now(),
            evidence,
            verification_id,
            signature: None,
        }
    }
}

#[async_trait]
impl VerifierPlugin for RetweetVerifier {
    fn validate_payload(&self, payload: &Value) -> Result<(), PocwError> {
        Self::validate(payload)
    }

    async fn validate_sync(&self, payload: &Value) -> Result<SyncVerification, PocwError> {
        Self::validate(payload)?;

        let response: VerifyRetweetResponse =
            self.client.post_json("/verify-retweet", payload).await?;

        if !response.success {
            return Err(PocwError::PermanentUpstream("verify-retweet call unsuccessful".into()));
        }

        if response.verified {
            let evidence = response.evidence.unwrap_or_else(|| payload.clone());
            Ok(SyncVerification::Verified(Self::proof(
                "twitter-middleware",
                response.verification_id,
                evidence,
            )))
        } else {
            Ok(SyncVerification::Pending)
        }
    }

    async fn register_async_watch(&self, payload: &Value) -> Result<String, PocwError> {
        #[derive(Deserialize)]
        struct RegisterWatchResponse {
            watch_id: String,
        }

        let response: RegisterWatchResponse =
            self.client.post_json("/register-watch", payload).await?;
        Ok(response.watch_id)
    }

    async fn check_async_status(&self, watch_id: &str) -> Result<AsyncStatus, PocwError> {
        let path = format!("/check-watch/{watch_id}");
        let response: WatchStatusResponse = self.client.get_json(&path).await?;

        if response.completed && response.verified {
            Ok(AsyncStatus::Completed(Self::proof(
                "twitter-middleware-watch",
                response.verification_id,
                response.evidence.unwrap_or(Value::Null),
            )))
        } else {
            Ok(AsyncStatus::Pending)
        }
    }

    fn supports_async(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_payload_missing_tweet_id() {
        let payload = json!({"twitter_id": "abc"});
        assert!(RetweetVerifier::validate(&payload).is_err());
    }

    #[test]
    fn accepts_complete_payload() {
        let payload = json!({"tweet_id": "1234567890", "twitter_id": "abc"});
        assert!(RetweetVerifier::validate(&payload).is_ok());
    }
}
