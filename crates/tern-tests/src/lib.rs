//! Integration tests for the tern wallet.
//!
//! The tests drive a real [`tern_wallet::Wallet`] against an in-process
//! [`helpers::TestChain`] that mines blocks, maintains a transaction pool,
//! and delivers chain updates (including reverts) to subscribed stores.

pub mod helpers;
