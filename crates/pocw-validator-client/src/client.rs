//! Parallel fan-out of a signed `MinerOutput` to every configured
//! validator endpoint, followed by aggregator forwarding or local
//! consensus.

use std::collections::HashSet;
use std::time::Duration;

use shared_types::entities::{ConsensusResult, MinerOutput, ValidatorVote};
use shared_types::ipc::{MinerOutputRequest, ValidationResponse};
use uuid::Uuid;

use crate::consensus;
use crate::errors::FanoutError;

/// A configured validator the client fans out to.
#[derive(Debug, Clone)]
pub struct ValidatorEndpoint {
    pub url: String,
    pub weight: f64,
    pub role: shared_types::entities::ValidatorRole,
}

/// Outcome of `send_miner_output`: either the votes were handed to an
/// external aggregator, or this process computed the consensus itself.
#[derive(Debug)]
pub enum FanoutOutcome {
    ForwardedToAggregator { votes_sent: usize },
    LocalConsensus(ConsensusResult),
}

pub struct ValidatorClientConfig {
    pub miner_id: u32,
    pub endpoints: Vec<ValidatorEndpoint>,
    pub aggregator_url: Option<String>,
    pub max_retries: u32,
    pub retry_interval: Duration,
    pub request_timeout: Duration,
}

pub struct ValidatorClient {
    http: reqwest::Client,
    config: ValidatorClientConfig,
}

impl ValidatorClient {
    pub fn new(config: ValidatorClientConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("reqwest client builder should not fail on static config");
        Self { http, config }
    }

    /// Fans out `output` to every validator endpoint in parallel, collects
    /// votes, then either forwards to the aggregator or runs local
    /// consensus. Returns only after every fan-out call has completed or
    /// exhausted its retries — individual validator ordering is not
    /// observable to the caller.
    pub async fn send_miner_output(&self, output: &MinerOutput) -> Result<FanoutOutcome, FanoutError> {
        let request = MinerOutputRequest {
            message_type: MinerOutputRequest::MESSAGE_TYPE.to_string(),
            message_id: Uuid::new_v4(),
            timestamp: output.timestamp,
            signature: output.signature.clone(),
            task_id: output.task_id,
            miner_id: output.miner_id,
            event_id: output.event_id.clone(),
            vlc_clock: output.vlc_clock.clone(),
            payload: output.payload.clone(),
            proof: output.proof.clone(),
            request_id: Uuid::new_v4(),
            task_type: output.task_type,
        };

        let calls = self
            .config
            .endpoints
            .iter()
            .map(|endpoint| self.call_with_retry(endpoint, &request));

        let responses = futures::future::join_all(calls).await;

        let mut votes = Vec::new();
        for (response, endpoint) in responses.into_iter().zip(&self.config.endpoints) {
            match response {
                Ok(Some(mut vote)) => {
                    vote.weight = endpoint.weight;
                    vote.validator_role = endpoint.role;
                    votes.push(vote);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "validator fan-out call failed after retries");
                }
            }
        }

        if votes.is_empty() {
            return Err(FanoutError::NoVotesCollected);
        }

        match &self.config.aggregator_url {
            Some(aggregator_url) => self.forward_to_aggregator(aggregator_url, votes).await,
            None => Ok(FanoutOutcome::LocalConsensus(consensus::compute(
                &output.event_id,
                votes,
            ))),
        }
    }

    async fn call_with_retry(
        &self,
        endpoint: &ValidatorEndpoint,
        request: &MinerOutputRequest,
    ) -> Result<Option<ValidatorVote>, reqwest::Error> {
        let url = format!("{}/api/v1/validate", endpoint.url);
        let mut attempt = 0;

        loop {
            let result = self
                .http
                .post(&url)
                .header("X-Miner-ID", self.config.miner_id.to_string())
                .header("X-Request-ID", request.request_id.to_string())
                .json(request)
                .send()
                .await;

            match result {
                Ok(response) => {
                    return Ok(Self::extract_vote(response.json::<ValidationResponse>().await))
                }
                Err(e) if attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::debug!(url, attempt, error = %e, "retrying validator call");
                    tokio::time::sleep(self.config.retry_interval).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn extract_vote(
        parsed: Result<ValidationResponse, reqwest::Error>,
    ) -> Option<ValidatorVote> {
        let body = parsed.ok()?;
        if !body.success {
            return None;
        }
        body.vote.map(|v| ValidatorVote {
            event_id: v.event_id,
            validator_id: v.validator_id,
            validator_role: shared_types::entities::ValidatorRole::Ui,
            vote: v.vote,
            score: v.score,
            weight: v.weight,
            reason: v.reason,
            vlc_state: v.vlc_state,
            signature: v.signature,
        })
    }

    /// Forwards every vote to the aggregator, one POST per vote, deduping
    /// on `event_id`+`validator_id` so a retried send can't double-count.
    async fn forward_to_aggregator(
        &self,
        aggregator_url: &str,
        votes: Vec<ValidatorVote>,
    ) -> Result<FanoutOutcome, FanoutError> {
        let mut seen = HashSet::new();
        let mut sent = 0;

        for vote in votes {
            let key = (vote.event_id.clone(), vote.validator_id);
            if !seen.insert(key) {
                continue;
            }

            let url = format!("{aggregator_url}/api/v1/aggregator/vote");
            self.http
                .post(&url)
                .json(&vote)
                .send()
                .await
                .map_err(|e| FanoutError::AggregatorUnreachable(e.to_string()))?;
            sent += 1;
        }

        Ok(FanoutOutcome::ForwardedToAggregator { votes_sent: sent })
    }
}
