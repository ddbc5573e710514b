//! ECDSA over NIST P-256 with SHA-256.
//!
//! Signatures are the concatenation of 32-byte big-endian `r` then `s`,
//! hex-encoded to 128 characters. There is no public-key recovery here —
//! unlike secp256k1/Ethereum-style signing, the verifier always needs the
//! signer's public key out of band.

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::errors::SigningError;

/// 32-byte `r` + 32-byte `s`, hex-encoded.
pub const SIGNATURE_HEX_LEN: usize = 128;

/// A PoCW signing identity. Never implements `Debug`/`Display` so it can't
/// end up in a log line by accident, and holds the raw scalar in a
/// zeroizing buffer rather than a long-lived `SigningKey` so the key
/// material is wiped as soon as this value drops.
pub struct Signer256 {
    key_bytes: Zeroizing<[u8; 32]>,
}

impl Signer256 {
    pub fn from_hex(hex_key: &str) -> Result<Self, SigningError> {
        let bytes =
            hex::decode(hex_key).map_err(|e| SigningError::InvalidPrivateKey(e.to_string()))?;
        let key = SigningKey::from_slice(&bytes)
            .map_err(|e| SigningError::InvalidPrivateKey(e.to_string()))?;

        let mut key_bytes = [0u8; 32];
        key_bytes.copy_from_slice(&key.to_bytes());
        Ok(Self { key_bytes: Zeroizing::new(key_bytes) })
    }

    /// Rebuilds the `SigningKey` for the duration of one call. `key_bytes`
    /// was already validated by `from_hex`, so this cannot fail.
    fn signing_key(&self) -> SigningKey {
        SigningKey::from_slice(&*self.key_bytes).expect("key_bytes was validated in from_hex")
    }

    pub fn verifying_key(&self) -> VerifyingKey256 {
        VerifyingKey256 {
            key: *self.signing_key().verifying_key(),
        }
    }

    /// Signs `message`, returning the hex-encoded `r||s` signature.
    pub fn sign(&self, message: &[u8]) -> String {
        let signature: Signature = self.signing_key().sign(message);
        hex::encode(signature.to_bytes())
    }
}

/// A PoCW verifying identity. Wraps a P-256 public key.
#[derive(Clone, Debug, PartialEq)]
pub struct VerifyingKey256 {
    key: VerifyingKey,
}

impl VerifyingKey256 {
    pub fn from_hex(hex_key: &str) -> Result<Self, SigningError> {
        let bytes =
            hex::decode(hex_key).map_err(|e| SigningError::InvalidPublicKey(e.to_string()))?;
        let key = VerifyingKey::from_sec1_bytes(&bytes)
            .map_err(|e| SigningError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { key })
    }

    pub fn to_sec1_hex(&self) -> String {
        hex::encode(self.key.to_encoded_point(true).as_bytes())
    }

    /// Verifies a hex-encoded `r||s` signature against `message`.
    ///
    /// Checks performed: hex decoding, 64-byte length, scalar range for
    /// both `r` and `s` (enforced by `Signature::from_bytes`), low-S
    /// malleability rejection, and finally the ECDSA equation itself.
    pub fn verify(&self, message: &[u8], signature_hex: &str) -> Result<bool, SigningError> {
        if signature_hex.len() != SIGNATURE_HEX_LEN {
            return Err(SigningError::InvalidSignatureLength(signature_hex.len()));
        }

        let raw = hex::decode(signature_hex)
            .map_err(|e| SigningError::InvalidSignatureEncoding(e.to_string()))?;

        let signature =
            Signature::from_slice(&raw).map_err(|_| SigningError::ScalarOutOfRange)?;

        if signature.normalize_s().is_some() {
            return Err(SigningError::HighS);
        }

        Ok(self.key.verify(message, &signature).is_ok())
    }
}

/// Constant-time comparison of two hex-encoded signatures, for callers
/// that need to compare signatures without leaking timing information
/// (e.g. replay-cache short-circuiting).
pub fn signatures_equal(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn keypair() -> (Signer256, VerifyingKey256) {
        let key = SigningKey::random(&mut OsRng);
        let hex_key = hex::encode(key.to_bytes());
        let signer = Signer256::from_hex(&hex_key).unwrap();
        let verifier = signer.verifying_key();
        (signer, verifier)
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let (signer, verifier) = keypair();
        let message = b"task_abc_1700000000";
        let signature = signer.sign(message);

        assert_eq!(signature.len(), SIGNATURE_HEX_LEN);
        assert!(verifier.verify(message, &signature).unwrap());
    }

    #[test]
    fn mutated_message_fails_verification() {
        let (signer, verifier) = keypair();
        let signature = signer.sign(b"original");
        assert!(!verifier.verify(b"tampered", &signature).unwrap());
    }

    #[test]
    fn mutated_signature_fails_verification() {
        let (signer, verifier) = keypair();
        let message = b"original";
        let mut signature = signer.sign(message);
        let last = signature.pop().unwrap();
        signature.push(if last == '0' { '1' } else { '0' });
        assert!(!verifier.verify(message, &signature).unwrap());
    }

    #[test]
    fn wrong_length_signature_is_rejected() {
        let (_, verifier) = keypair();
        let err = verifier.verify(b"x", "deadbeef").unwrap_err();
        assert!(matches!(err, SigningError::InvalidSignatureLength(_)));
    }

    #[test]
    fn different_signer_fails_verification() {
        let (signer_a, _) = keypair();
        let (_, verifier_b) = keypair();
        let signature = signer_a.sign(b"message");
        assert!(!verifier_b.verify(b"message", &signature).unwrap());
    }
}
