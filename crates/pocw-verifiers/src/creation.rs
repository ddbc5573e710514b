//! Self-attesting task-creation verifier: no external call, the payload
//! itself is the proof once it passes a structural check.

use async_trait::async_trait;
use serde_json::Value;
use shared_types::entities::TaskProof;
use shared_types::errors::PocwError;

use crate::port::{SyncVerification, VerifierPlugin};

const REQUIRED_FIELDS: &[&str] = &[
    "project_name",
    "description",
    "twitter_username",
    "twitter_link",
    "tweet_id",
];

pub struct CreationVerifier;

impl CreationVerifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CreationVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VerifierPlugin for CreationVerifier {
    fn validate_payload(&self, payload: &Value) -> Result<(), PocwError> {
        for field in REQUIRED_FIELDS {
            let value = payload.get(field).and_then(Value::as_str);
            if value.map(str::is_empty).unwrap_or(true) {
                return Err(PocwError::validation(format!("missing or empty field: {field}")));
            }
        }
        Ok(())
    }

    async fn validate_sync(&self, payload: &Value) -> Result<SyncVerification, PocwError> {
        self.validate_payload(payload)?;

        let proof = TaskProof {
            provider: "task-creation-internal".to_string(),
            verified_at: chrono::Utc::now(),
            evidence: payload.clone(),
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

    fn valid_payload() -> Value {
        json!({
            "project_name": "p",
            "description": "d",
            "twitter_username": "u",
            "twitter_link": "l",
            "tweet_id": "123",
        })
    }

    #[tokio::test]
    async fn valid_payload_verifies_synchronously() {
        let verifier = CreationVerifier::new();
        let outcome = verifier.validate_sync(&valid_payload()).await.unwrap();
        assert!(matches!(outcome, SyncVerification::Verified(_)));
    }

    #[test]
    fn missing_field_is_rejected() {
        let verifier = CreationVerifier::new();
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove("tweet_id");
        assert!(verifier.validate_payload(&payload).is_err());
    }
}
