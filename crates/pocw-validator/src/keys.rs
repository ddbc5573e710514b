//! Static miner public key distribution.
//!
//! The reference implementation never actually verifies miner signatures
//! (`TODO: Implement proper public key retrieval`). This resolves that open
//! question with the simplest compliant option: a static config map loaded
//! once at startup, keyed by `miner_id`. An on-chain registry would hang off
//! the same lookup interface.

use std::collections::HashMap;

use pocw_signing::{SigningError, VerifyingKey256};

use crate::errors::ValidationError;

pub struct MinerKeyStore {
    keys: HashMap<u32, VerifyingKey256>,
}

impl MinerKeyStore {
    /// Builds the store from `miner_id -> hex-encoded SEC1 public key`
    /// pairs, the shape of the `MINER_PUBLIC_KEYS` config value.
    pub fn from_hex_map(entries: &HashMap<u32, String>) -> Result<Self, SigningError> {
        let mut keys = HashMap::with_capacity(entries.len());
        for (&miner_id, hex_key) in entries {
            keys.insert(miner_id, VerifyingKey256::from_hex(hex_key)?);
        }
        Ok(Self { keys })
    }

    pub fn lookup(&self, miner_id: u32) -> Result<&VerifyingKey256, ValidationError> {
        self.keys.get(&miner_id).ok_or(ValidationError::UnknownMinerKey(miner_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn unknown_miner_is_rejected() {
        let store = MinerKeyStore::from_hex_map(&HashMap::new()).unwrap();
        assert_eq!(store.lookup(1), Err(ValidationError::UnknownMinerKey(1)));
    }

    #[test]
    fn known_miner_resolves() {
        let key = p256::ecdsa::SigningKey::random(&mut OsRng);
        let signer = pocw_signing::Signer256::from_hex(&hex::encode(key.to_bytes())).unwrap();
        let public_hex = signer.verifying_key().to_sec1_hex();

        let mut entries = HashMap::new();
        entries.insert(1u32, public_hex);
        let store = MinerKeyStore::from_hex_map(&entries).unwrap();

        assert!(store.lookup(1).is_ok());
    }
}
