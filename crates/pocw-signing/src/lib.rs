//! ECDSA P-256/SHA-256 signing for `MinerOutput`s and `ValidatorVote`s, over
//! a canonical, fixed-key-order JSON encoding of each message's signed
//! subset.

mod canonical;
mod ecdsa;
mod errors;

pub use ecdsa::{signatures_equal, Signer256, VerifyingKey256, SIGNATURE_HEX_LEN};
pub use errors::SigningError;

use shared_types::clock::VectorClockSnapshot;
use shared_types::entities::Vote;
use uuid::Uuid;

/// Signs the canonical subset of a `MinerOutput`.
pub fn sign_miner_output(
    signer: &Signer256,
    task_id: Uuid,
    miner_id: u32,
    event_id: &str,
    vlc_clock: &VectorClockSnapshot,
    timestamp_unix: i64,
) -> Result<String, SigningError> {
    let input =
        canonical::miner_output_signing_input(task_id, miner_id, event_id, vlc_clock, timestamp_unix)?;
    Ok(signer.sign(&input))
}

/// Verifies a signature over the canonical subset of a `MinerOutput`.
pub fn verify_miner_output(
    verifier: &VerifyingKey256,
    task_id: Uuid,
    miner_id: u32,
    event_id: &str,
    vlc_clock: &VectorClockSnapshot,
    timestamp_unix: i64,
    signature: &str,
) -> Result<bool, SigningError> {
    let input =
        canonical::miner_output_signing_input(task_id, miner_id, event_id, vlc_clock, timestamp_unix)?;
    verifier.verify(&input, signature)
}

/// Signs the canonical subset of a `ValidatorVote`.
pub fn sign_vote(
    signer: &Signer256,
    event_id: &str,
    validator_id: u32,
    vote: Vote,
    score: f64,
    timestamp_unix: i64,
) -> Result<String, SigningError> {
    let input = canonical::vote_signing_input(event_id, validator_id, vote, score, timestamp_unix)?;
    Ok(signer.sign(&input))
}

/// Verifies a signature over the canonical subset of a `ValidatorVote`.
pub fn verify_vote(
    verifier: &VerifyingKey256,
    event_id: &str,
    validator_id: u32,
    vote: Vote,
    score: f64,
    timestamp_unix: i64,
    signature: &str,
) -> Result<bool, SigningError> {
    let input = canonical::vote_signing_input(event_id, validator_id, vote, score, timestamp_unix)?;
    verifier.verify(&input, signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn keypair() -> (Signer256, VerifyingKey256) {
        let key = p256::ecdsa::SigningKey::random(&mut OsRng);
        let hex_key = hex::encode(key.to_bytes());
        let signer = Signer256::from_hex(&hex_key).unwrap();
        let verifier = signer.verifying_key();
        (signer, verifier)
    }

    #[test]
    fn miner_output_signature_round_trips() {
        let (signer, verifier) = keypair();
        let vlc = VectorClockSnapshot::empty(1);
        let task_id = Uuid::new_v4();

        let signature =
            sign_miner_output(&signer, task_id, 1, "task_x_1700000000", &vlc, 1_700_000_000)
                .unwrap();

        assert!(verify_miner_output(
            &verifier,
            task_id,
            1,
            "task_x_1700000000",
            &vlc,
            1_700_000_000,
            &signature
        )
        .unwrap());
    }

    #[test]
    fn tampered_vlc_fails_verification() {
        let (signer, verifier) = keypair();
        let vlc = VectorClockSnapshot::empty(1);
        let task_id = Uuid::new_v4();

        let signature =
            sign_miner_output(&signer, task_id, 1, "task_x_1", &vlc, 1_000).unwrap();

        let mut tampered = vlc.clone();
        tampered.values.insert(1, 99);

        assert!(!verify_miner_output(
            &verifier, task_id, 1, "task_x_1", &tampered, 1_000, &signature
        )
        .unwrap());
    }

    #[test]
    fn vote_signature_round_trips() {
        let (signer, verifier) = keypair();
        let signature = sign_vote(&signer, "task_x_1", 2, Vote::Accept, 0.9, 1_000).unwrap();
        assert!(verify_vote(&verifier, "task_x_1", 2, Vote::Accept, 0.9, 1_000, &signature).unwrap());
        assert!(!verify_vote(&verifier, "task_x_1", 2, Vote::Reject, 0.9, 1_000, &signature).unwrap());
    }
}
