//! Local weighted consensus: computed when no aggregator is configured.

use shared_types::entities::{ConsensusResult, ValidatorVote, Vote};

/// Computes the weighted accept/reject outcome for a set of votes.
///
/// Tie-break at exactly half the total weight is a reject — the inequality
/// is strict.
pub fn compute(event_id: &str, votes: Vec<ValidatorVote>) -> ConsensusResult {
    let total_weight: f64 = votes.iter().map(|v| v.weight).sum();
    let accept_weight: f64 = votes
        .iter()
        .filter(|v| v.vote == Vote::Accept)
        .map(|v| v.weight)
        .sum();
    let reject_weight = total_weight - accept_weight;

    let consensus_reached = accept_weight > total_weight / 2.0;
    let final_decision = if consensus_reached { Vote::Accept } else { Vote::Reject };

    ConsensusResult {
        event_id: event_id.to_string(),
        votes,
        total_weight,
        accept_weight,
        reject_weight,
        final_decision,
        consensus_reached,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::clock::VectorClockSnapshot;
    use shared_types::entities::ValidatorRole;

    fn vote(weight: f64, decision: Vote) -> ValidatorVote {
        ValidatorVote {
            event_id: "e1".to_string(),
            validator_id: 2,
            validator_role: ValidatorRole::Ui,
            vote: decision,
            score: if decision == Vote::Accept { 0.9 } else { 0.1 },
            weight,
            reason: String::new(),
            vlc_state: VectorClockSnapshot::empty(1),
            signature: String::new(),
        }
    }

    #[test]
    fn weighted_majority_accepts() {
        let votes = vec![
            vote(0.4, Vote::Accept),
            vote(0.2, Vote::Reject),
            vote(0.4, Vote::Accept),
        ];
        let result = compute("e1", votes);
        assert_eq!(result.accept_weight, 0.8);
        assert!(result.consensus_reached);
        assert_eq!(result.final_decision, Vote::Accept);
    }

    #[test]
    fn weighted_minority_rejects() {
        let votes = vec![
            vote(0.4, Vote::Accept),
            vote(0.2, Vote::Reject),
            vote(0.4, Vote::Reject),
        ];
        let result = compute("e1", votes);
        assert_eq!(result.accept_weight, 0.4);
        assert!(!result.consensus_reached);
        assert_eq!(result.final_decision, Vote::Reject);
    }

    #[test]
    fn exact_tie_rejects() {
        let votes = vec![vote(0.5, Vote::Accept), vote(0.5, Vote::Reject)];
        let result = compute("e1", votes);
        assert!(!result.consensus_reached, "exact half must reject, not accept");
    }
}
