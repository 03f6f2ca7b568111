//! Single-address wallet: UTXO tracking, coin selection, transaction
//! funding, signing, and output redistribution.
//!
//! The wallet owns one Ed25519 key and treats every output paid to the
//! key's address as its own. Chain data comes from a [`ChainManager`];
//! confirmed state is persisted through a [`Store`], which receives
//! atomic apply/revert updates so reorgs never leave partial state.
//!
//! Construction-time reservations are kept in memory only: funding a
//! transaction reserves the selected outputs so concurrent calls cannot
//! double-spend them. Reservations end when released explicitly or when
//! they expire; an entry for an output that has since been spent on chain
//! is harmless, since the store no longer offers that output.

pub mod chain;
pub mod config;
pub mod error;
pub mod events;
mod pool;
pub mod redistribute;
mod reservations;
pub mod selection;
pub mod store;
pub mod wallet;

pub use chain::ChainManager;
pub use config::WalletConfig;
pub use error::{ChainError, StoreError, WalletError};
pub use events::{is_relevant_transaction, Event, EventSource};
pub use redistribute::{RedistributionPlan, REDISTRIBUTE_BATCH_SIZE};
pub use selection::Selection;
pub use store::{AppliedBlock, ChainSubscriber, ChainUpdate, MemoryStore, RevertedBlock, Store};
pub use wallet::{Balance, Wallet};
