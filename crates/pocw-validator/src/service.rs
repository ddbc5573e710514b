//! Role-dispatched validation: replay and time-window guards, miner
//! signature verification, then one of three scoring paths depending on
//! which role this validator instance plays.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use shared_bus::ReplayCache;
use shared_types::entities::{TaskType, ValidatorRole, Vote};
use shared_types::ipc::{MinerOutputRequest, ValidatorVoteResponse};

use pocw_signing::Signer256;
use pocw_telemetry::{REPLAY_REJECTIONS, VOTES_CAST};
use pocw_verifiers::VerifierRegistry;
use pocw_vlc::ValidatorVlcService;

use crate::errors::ValidationError;
use crate::keys::MinerKeyStore;
use crate::quality::QualityPlugin;

/// Tolerance on either side of "now" for an accepted request timestamp.
const TIME_WINDOW_PAST: Duration = Duration::minutes(5);
const TIME_WINDOW_FUTURE: Duration = Duration::minutes(1);

/// Accept threshold the semantic role checks explicitly against the raw
/// quality score, rather than the plugin's own `accepted` flag.
const SEMANTIC_ACCEPT_THRESHOLD: f64 = 0.6;

struct RoleOutcome {
    vote: Vote,
    score: f64,
    reason: String,
}

pub struct ValidatorService {
    validator_id: u32,
    role: ValidatorRole,
    weight: f64,
    signer: Arc<Signer256>,
    miner_keys: MinerKeyStore,
    vlc: Arc<ValidatorVlcService>,
    replay: Mutex<ReplayCache>,
    verifiers: Arc<VerifierRegistry>,
    quality: Arc<dyn QualityPlugin>,
}

impl ValidatorService {
    pub fn new(
        validator_id: u32,
        role: ValidatorRole,
        weight: f64,
        signer: Arc<Signer256>,
        miner_keys: MinerKeyStore,
        vlc: Arc<ValidatorVlcService>,
        verifiers: Arc<VerifierRegistry>,
        quality: Arc<dyn QualityPlugin>,
    ) -> Self {
        Self {
            validator_id,
            role,
            weight,
            signer,
            miner_keys,
            vlc,
            replay: Mutex::new(ReplayCache::new()),
            verifiers,
            quality,
        }
    }

    /// Handles one `POST /api/v1/validate` request. Guard failures (replay,
    /// time window, bad signature) are request-level errors; once past
    /// them, role dispatch always produces a vote — accept or reject.
    pub async fn validate(&self, request: &MinerOutputRequest) -> Result<ValidatorVoteResponse, ValidationError> {
        let _span = tracing::debug_span!("validate", event_id = %request.event_id, task_id = %request.task_id, miner_id = request.miner_id).entered();

        if let Err(e) = self.replay.lock().check_and_insert(&request.event_id) {
            REPLAY_REJECTIONS.inc();
            tracing::warn!(event_id = %request.event_id, "rejecting replayed event");
            return Err(ValidationError::Replay(e.to_string()));
        }

        check_time_window(request.timestamp, Utc::now())?;

        let miner_key = self.miner_keys.lookup(request.miner_id)?;
        let signature_ok = pocw_signing::verify_miner_output(
            miner_key,
            request.task_id,
            request.miner_id,
            &request.event_id,
            &request.vlc_clock,
            request.timestamp.timestamp(),
            &request.signature,
        )
        .map_err(|e| ValidationError::Internal(e.to_string()))?;

        if !signature_ok {
            return Err(ValidationError::SignatureInvalid);
        }

        let outcome = self.dispatch_role(request.task_type, &request.vlc_clock, &request.payload, &request.proof);

        tracing::debug!(vote = vote_label(outcome.vote), score = outcome.score, reason = %outcome.reason, "role dispatch decided");
        VOTES_CAST
            .with_label_values(&[role_label(self.role), vote_label(outcome.vote)])
            .inc();

        let vote_timestamp = Utc::now().timestamp();
        let signature = pocw_signing::sign_vote(
            &self.signer,
            &request.event_id,
            self.validator_id,
            outcome.vote,
            outcome.score,
            vote_timestamp,
        )
        .map_err(|e| ValidationError::Internal(e.to_string()))?;

        Ok(ValidatorVoteResponse {
            event_id: request.event_id.clone(),
            validator_id: self.validator_id,
            vote: outcome.vote,
            score: outcome.score,
            weight: self.weight,
            reason: outcome.reason,
            vlc_state: self.vlc.current_clock(),
            signature,
        })
    }

    fn dispatch_role(
        &self,
        task_type: TaskType,
        miner_vlc: &shared_types::clock::VectorClockSnapshot,
        payload: &serde_json::Value,
        proof: &shared_types::entities::TaskProof,
    ) -> RoleOutcome {
        match self.role {
            ValidatorRole::Ui => {
                if !self.vlc.validate_sequence(miner_vlc, 1) {
                    return RoleOutcome {
                        vote: Vote::Reject,
                        score: 0.0,
                        reason: "VLC causality violation: miner clock does not strictly extend the observed mirror".to_string(),
                    };
                }
                self.vlc.update_miner(miner_vlc);

                if !self.format_ok(task_type, payload) {
                    return RoleOutcome {
                        vote: Vote::Reject,
                        score: 0.2,
                        reason: "payload failed format validation".to_string(),
                    };
                }

                let quality = self.quality.assess(payload, proof);
                RoleOutcome {
                    vote: if quality.accepted { Vote::Accept } else { Vote::Reject },
                    score: quality.score,
                    reason: quality.reason,
                }
            }
            ValidatorRole::Format => {
                if miner_vlc.values.is_empty() {
                    return RoleOutcome {
                        vote: Vote::Reject,
                        score: 0.0,
                        reason: "VLC is empty".to_string(),
                    };
                }
                if !self.format_ok(task_type, payload) {
                    return RoleOutcome {
                        vote: Vote::Reject,
                        score: 0.1,
                        reason: "payload failed format validation".to_string(),
                    };
                }
                if proof.signature.is_none() {
                    return RoleOutcome {
                        vote: Vote::Reject,
                        score: 0.3,
                        reason: "proof is missing its upstream signature".to_string(),
                    };
                }

                let quality = self.quality.assess(payload, proof);
                RoleOutcome {
                    vote: if quality.accepted { Vote::Accept } else { Vote::Reject },
                    score: quality.score,
                    reason: quality.reason,
                }
            }
            ValidatorRole::Semantic => {
                if miner_vlc.values.is_empty() {
                    return RoleOutcome {
                        vote: Vote::Reject,
                        score: 0.0,
                        reason: "VLC is empty".to_string(),
                    };
                }
                if !self.format_ok(task_type, payload) {
                    return RoleOutcome {
                        vote: Vote::Reject,
                        score: 0.15,
                        reason: "failed business-logic check".to_string(),
                    };
                }

                let quality = self.quality.assess(payload, proof);
                RoleOutcome {
                    vote: if quality.score >= SEMANTIC_ACCEPT_THRESHOLD { Vote::Accept } else { Vote::Reject },
                    score: quality.score,
                    reason: quality.reason,
                }
            }
        }
    }

    fn format_ok(&self, task_type: TaskType, payload: &serde_json::Value) -> bool {
        self.verifiers
            .resolve(task_type)
            .map(|plugin| plugin.validate_payload(payload).is_ok())
            .unwrap_or(false)
    }
}

fn check_time_window(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), ValidationError> {
    let earliest = now - TIME_WINDOW_PAST;
    let latest = now + TIME_WINDOW_FUTURE;
    if timestamp < earliest || timestamp > latest {
        return Err(ValidationError::TimeWindow(format!(
            "{timestamp} outside accepted window [{earliest}, {latest}]"
        )));
    }
    Ok(())
}

fn role_label(role: ValidatorRole) -> &'static str {
    match role {
        ValidatorRole::Ui => "ui",
        ValidatorRole::Format => "format",
        ValidatorRole::Semantic => "semantic",
    }
}

fn vote_label(vote: Vote) -> &'static str {
    match vote {
        Vote::Accept => "accept",
        Vote::Reject => "reject",
    }
}
