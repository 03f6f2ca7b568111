//! Error types for tern-core.
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("currency underflow")] Underflow,
    #[error("currency overflow")] Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("invalid signature bytes")] InvalidSignature,
    #[error("signature verification failed")] VerificationFailed,
    #[error("covered {field} index out of bounds: {index}")] CoveredFieldOutOfBounds { field: &'static str, index: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("serialization: {0}")] Serialization(String),
}
