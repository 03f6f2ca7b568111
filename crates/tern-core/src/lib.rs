//! # tern-core
//! Foundation types for the Tern single-address wallet.

pub mod currency;
pub mod crypto;
pub mod error;
pub mod state;
pub mod types;
