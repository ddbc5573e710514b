//! Canonical signing-input encoding.
//!
//! JSON key order is not canonical by default; two implementations that
//! serialize the same logical message in a different field order produce
//! different byte strings and fail cross-verification. These structs fix
//! the field order explicitly — derive's `Serialize` emits struct fields
//! in declaration order regardless of the `serde_json` feature set — and
//! timestamps are encoded as integer unix seconds, never as floats or
//! RFC 3339 strings.

use serde::Serialize;
use serde_json::Value;
use shared_types::clock::VectorClockSnapshot;
use shared_types::entities::Vote;
use uuid::Uuid;

use crate::errors::SigningError;

/// Canonical subset signed over a `MinerOutput`: task id, miner id, event
/// id, VLC snapshot, and the unix timestamp — in this declaration order.
#[derive(Serialize)]
struct CanonicalMinerOutput<'a> {
    task_id: Uuid,
    miner_id: u32,
    event_id: &'a str,
    vlc_clock: &'a VectorClockSnapshot,
    timestamp: i64,
}

/// Canonical subset signed over a `ValidatorVote`: event id, validator id,
/// vote, score, and the unix timestamp — in this declaration order.
#[derive(Serialize)]
struct CanonicalVote<'a> {
    event_id: &'a str,
    validator_id: u32,
    vote: Vote,
    score: f64,
    timestamp: i64,
}

pub fn miner_output_signing_input(
    task_id: Uuid,
    miner_id: u32,
    event_id: &str,
    vlc_clock: &VectorClockSnapshot,
    timestamp_unix: i64,
) -> Result<Vec<u8>, SigningError> {
    let canonical = CanonicalMinerOutput {
        task_id,
        miner_id,
        event_id,
        vlc_clock,
        timestamp: timestamp_unix,
    };
    encode(&canonical)
}

pub fn vote_signing_input(
    event_id: &str,
    validator_id: u32,
    vote: Vote,
    score: f64,
    timestamp_unix: i64,
) -> Result<Vec<u8>, SigningError> {
    let canonical = CanonicalVote {
        event_id,
        validator_id,
        vote,
        score,
        timestamp: timestamp_unix,
    };
    encode(&canonical)
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, SigningError> {
    // Round-trip through `Value` only to assert the encoding is valid JSON;
    // the bytes actually signed are the direct struct serialization so
    // field order is never reshuffled by a map's key-sorting behavior.
    let bytes = serde_json::to_vec(value).map_err(|e| SigningError::CanonicalEncoding(e.to_string()))?;
    let _: Value = serde_json::from_slice(&bytes).map_err(|e| SigningError::CanonicalEncoding(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miner_output_input_is_stable_across_calls() {
        let vlc = VectorClockSnapshot::empty(1);
        let task_id = Uuid::nil();
        let a = miner_output_signing_input(task_id, 1, "task_x_1", &vlc, 1_000).unwrap();
        let b = miner_output_signing_input(task_id, 1, "task_x_1", &vlc, 1_000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn mutating_any_field_changes_the_input() {
        let vlc = VectorClockSnapshot::empty(1);
        let task_id = Uuid::nil();
        let a = miner_output_signing_input(task_id, 1, "task_x_1", &vlc, 1_000).unwrap();
        let b = miner_output_signing_input(task_id, 1, "task_x_1", &vlc, 1_001).unwrap();
        assert_ne!(a, b);
    }
}
