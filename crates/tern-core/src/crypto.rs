//! Ed25519 key material for signing transaction inputs.
//!
//! Wraps ed25519-dalek for signing and verification and BLAKE3 for address
//! derivation. The signing hashes themselves live in [`crate::state`], since
//! they are parameterized by chain state.

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::CryptoError;
use crate::types::Address;

/// Ed25519 keypair controlling a wallet address.
///
/// Wraps [`ed25519_dalek::SigningKey`]. The secret key is zeroized on drop
/// by the underlying library. Use [`KeyPair::generate`] for random keys or
/// [`KeyPair::from_secret_bytes`] for deterministic derivation from a seed.
pub struct KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl KeyPair {
    /// Generate a random keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Create a keypair from 32-byte secret key material.
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(&bytes),
        }
    }

    /// Derive the public key from this keypair.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// The address controlled by this keypair.
    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    /// Get the raw secret key bytes (32 bytes). Handle with care.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Sign a message, returning the raw 64-byte Ed25519 signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self::from_secret_bytes(self.secret_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Ed25519 public key for verifying input signatures and deriving addresses.
#[derive(Clone)]
pub struct PublicKey {
    verifying_key: ed25519_dalek::VerifyingKey,
}

impl PublicKey {
    /// Create a public key from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let vk = ed25519_dalek::VerifyingKey::from_bytes(bytes)
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self { verifying_key: vk })
    }

    /// Get the raw public key bytes (32 bytes).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// The address committing to this key: BLAKE3 of the raw key bytes.
    pub fn address(&self) -> Address {
        Address::from_key_bytes(&self.to_bytes())
    }

    /// Verify an Ed25519 signature on a message.
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> Result<(), CryptoError> {
        let sig = ed25519_dalek::Signature::from_bytes(signature);
        self.verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::VerificationFailed)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.to_bytes()))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PublicKey {}

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_bytes().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = <[u8; 32]>::deserialize(deserializer)?;
        Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- KeyPair ---

    #[test]
    fn keypair_generate_unique() {
        let kp1 = KeyPair::generate();
        let kp2 = KeyPair::generate();
        assert_ne!(kp1.public_key(), kp2.public_key());
    }

    #[test]
    fn keypair_from_secret_deterministic() {
        let seed = [42u8; 32];
        let kp1 = KeyPair::from_secret_bytes(seed);
        let kp2 = KeyPair::from_secret_bytes(seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.secret_bytes(), kp2.secret_bytes());
    }

    #[test]
    fn keypair_different_seeds_different_keys() {
        let kp1 = KeyPair::from_secret_bytes([1u8; 32]);
        let kp2 = KeyPair::from_secret_bytes([2u8; 32]);
        assert_ne!(kp1.public_key(), kp2.public_key());
    }

    #[test]
    fn keypair_debug_hides_secret() {
        let kp = KeyPair::generate();
        let debug = format!("{kp:?}");
        assert!(debug.contains("KeyPair"));
        assert!(debug.contains("public_key"));
        // Secret bytes should NOT appear in debug output
        let secret_hex = hex::encode(kp.secret_bytes());
        assert!(!debug.contains(&secret_hex));
    }

    #[test]
    fn keypair_address_matches_pubkey() {
        let kp = KeyPair::from_secret_bytes([9u8; 32]);
        assert_eq!(kp.address(), kp.public_key().address());
        assert_eq!(
            kp.address(),
            Address::from_key_bytes(&kp.public_key().to_bytes())
        );
    }

    // --- PublicKey ---

    #[test]
    fn pubkey_from_bytes_roundtrip() {
        let kp = KeyPair::generate();
        let pk = kp.public_key();
        let bytes = pk.to_bytes();
        let pk2 = PublicKey::from_bytes(&bytes).unwrap();
        assert_eq!(pk, pk2);
    }

    #[test]
    fn pubkey_from_invalid_bytes_fails() {
        // About half of all 32-byte values fail Ed25519 point decompression.
        // Try small y values until we find one that's invalid.
        let mut found_invalid = false;
        for i in 0u8..=20 {
            let mut bytes = [0u8; 32];
            bytes[0] = i;
            if PublicKey::from_bytes(&bytes).is_err() {
                assert_eq!(
                    PublicKey::from_bytes(&bytes).unwrap_err(),
                    CryptoError::InvalidPublicKey
                );
                found_invalid = true;
                break;
            }
        }
        assert!(
            found_invalid,
            "expected at least one y value in 0..=20 to fail Ed25519 decompression"
        );
    }

    #[test]
    fn pubkey_display() {
        let kp = KeyPair::generate();
        let pk = kp.public_key();
        let display = format!("{pk}");
        assert_eq!(display.len(), 64); // 32 bytes = 64 hex chars
        assert!(display.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn pubkey_serde_json_roundtrip() {
        let kp = KeyPair::generate();
        let pk = kp.public_key();
        let json = serde_json::to_string(&pk).unwrap();
        let pk2: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(pk, pk2);
    }

    // --- Sign / Verify messages ---

    #[test]
    fn sign_verify_message() {
        let kp = KeyPair::generate();
        let msg = b"hello tern";
        let sig = kp.sign(msg);
        assert!(kp.public_key().verify(msg, &sig).is_ok());
    }

    #[test]
    fn verify_wrong_key_fails() {
        let kp1 = KeyPair::generate();
        let kp2 = KeyPair::generate();
        let msg = b"hello tern";
        let sig = kp1.sign(msg);
        let err = kp2.public_key().verify(msg, &sig).unwrap_err();
        assert_eq!(err, CryptoError::VerificationFailed);
    }

    #[test]
    fn verify_wrong_message_fails() {
        let kp = KeyPair::generate();
        let sig = kp.sign(b"original");
        let err = kp.public_key().verify(b"tampered", &sig).unwrap_err();
        assert_eq!(err, CryptoError::VerificationFailed);
    }
}
