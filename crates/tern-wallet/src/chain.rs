//! The wallet's view of the rest of the node.

use std::sync::Arc;

use tern_core::state::TipState;
use tern_core::types::{ChainIndex, Transaction};

use crate::error::ChainError;
use crate::store::ChainSubscriber;

/// Everything the wallet needs from a chain node: the current tip, the
/// transaction pool, and a subscription feed of chain updates.
///
/// `subscribe` must first deliver the updates needed to bring a subscriber
/// from `from` to the current tip, then keep it current as blocks arrive.
/// Updates to a single subscriber are delivered sequentially.
pub trait ChainManager: Send + Sync {
    /// Consensus state at the current tip.
    fn tip_state(&self) -> TipState;

    /// The current transaction pool contents.
    fn pool_transactions(&self) -> Vec<Transaction>;

    /// Register a subscriber whose state currently reflects `from`.
    fn subscribe(
        &self,
        subscriber: Arc<dyn ChainSubscriber>,
        from: ChainIndex,
    ) -> Result<(), ChainError>;

    /// Remove a previously registered subscriber. Identity is by
    /// allocation, so pass a clone of the same `Arc` given to `subscribe`.
    fn unsubscribe(&self, subscriber: &Arc<dyn ChainSubscriber>);
}
