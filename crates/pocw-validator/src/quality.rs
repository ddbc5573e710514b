//! Quality scoring plugins consulted after format/causality checks pass.

use serde_json::Value;
use shared_types::entities::TaskProof;

/// Outcome of a quality assessment. `score` is always clamped to `[0, 1]`.
pub struct QualityAssessment {
    pub score: f64,
    pub accepted: bool,
    pub reason: String,
}

/// A quality plugin scores a payload+proof pair for acceptance, independent
/// of the format/causality checks that run before it.
pub trait QualityPlugin: Send + Sync {
    fn assess(&self, payload: &Value, proof: &TaskProof) -> QualityAssessment;
}

/// Quality scoring tuned to Twitter-shaped payloads: a `twitter_id` (handle)
/// and a `tweet_id`, possibly duplicated inside the proof's evidence.
pub struct TwitterQualityPlugin {
    pub accept_threshold: f64,
}

impl Default for TwitterQualityPlugin {
    fn default() -> Self {
        Self { accept_threshold: 0.6 }
    }
}

impl TwitterQualityPlugin {
    fn field(value: &Value, key: &str) -> Option<String> {
        value.get(key).and_then(Value::as_str).map(str::to_string)
    }

    fn valid_twitter_id(id: &str) -> bool {
        (3..=15).contains(&id.len()) && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    fn valid_tweet_id(id: &str) -> bool {
        (10..=25).contains(&id.len()) && id.chars().all(|c| c.is_ascii_digit())
    }
}

impl QualityPlugin for TwitterQualityPlugin {
    fn assess(&self, payload: &Value, proof: &TaskProof) -> QualityAssessment {
        let mut score = 1.0_f64;
        let mut reasons = Vec::new();

        if let Some(id) = Self::field(payload, "twitter_id") {
            if !Self::valid_twitter_id(&id) {
                score -= 0.3;
                reasons.push("twitter_id fails format check".to_string());
            }
        }
        if let Some(id) = Self::field(payload, "tweet_id") {
            if !Self::valid_tweet_id(&id) {
                score -= 0.3;
                reasons.push("tweet_id fails format check".to_string());
            }
        }

        for key in ["twitter_id", "tweet_id"] {
            if let (Some(p), Some(e)) = (Self::field(payload, key), Self::field(&proof.evidence, key)) {
                if p != e {
                    score -= 0.4;
                    reasons.push(format!("{key} mismatch between payload and proof evidence"));
                }
            }
        }

        score = score.clamp(0.0, 1.0);
        let accepted = score >= self.accept_threshold;
        let reason = if reasons.is_empty() {
            "quality checks passed".to_string()
        } else {
            reasons.join("; ")
        };

        QualityAssessment { score, accepted, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn proof(evidence: Value) -> TaskProof {
        TaskProof {
            provider: "test".to_string(),
            verified_at: chrono::Utc::now(),
            evidence,
            verification_id: None,
            signature: None,
        }
    }

    #[test]
    fn well_formed_fields_score_highly() {
        let plugin = TwitterQualityPlugin::default();
        let payload = json!({"twitter_id": "user_one", "tweet_id": "1234567890"});
        let assessment = plugin.assess(&payload, &proof(payload.clone()));
        assert!(assessment.accepted);
        assert_eq!(assessment.score, 1.0);
    }

    #[test]
    fn malformed_tweet_id_loses_score() {
        let plugin = TwitterQualityPlugin::default();
        let payload = json!({"twitter_id": "user_one", "tweet_id": "abc"});
        let assessment = plugin.assess(&payload, &proof(payload.clone()));
        assert!((assessment.score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn mismatched_evidence_is_penalized_past_threshold() {
        let plugin = TwitterQualityPlugin::default();
        let payload = json!({"twitter_id": "user_one", "tweet_id": "1234567890"});
        let evidence = json!({"twitter_id": "user_one", "tweet_id": "9999999999"});
        let assessment = plugin.assess(&payload, &proof(evidence));
        assert!(!assessment.accepted);
        assert!((assessment.score - 0.6).abs() < 1e-9);
    }
}
