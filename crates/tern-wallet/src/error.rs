//! Error types for tern-wallet.
use thiserror::Error;

use tern_core::currency::Currency;
use tern_core::error::{CryptoError, CurrencyError, EncodingError};
use tern_core::types::{ChainIndex, OutputId};

/// Errors from wallet operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("not enough funds: have {have}, need {need}")] NotEnoughFunds { have: Currency, need: Currency },
    #[error("store: {0}")] Store(#[from] StoreError),
    #[error("chain: {0}")] Chain(#[from] ChainError),
    #[error(transparent)] Currency(#[from] CurrencyError),
    #[error(transparent)] Crypto(#[from] CryptoError),
    #[error(transparent)] Encoding(#[from] EncodingError),
}

/// Errors from a wallet store backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown output {0}")] UnknownOutput(OutputId),
    #[error("tip mismatch: expected {expected}, got {got}")] TipMismatch { expected: ChainIndex, got: ChainIndex },
    #[error("backend: {0}")] Backend(String),
}

/// Errors from the chain manager.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("unknown chain index {0}")] UnknownIndex(ChainIndex),
    #[error("subscriber rejected update: {0}")] Subscriber(String),
}
