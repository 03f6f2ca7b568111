//! Persistent wallet state and the chain update contract.
//!
//! A [`Store`] holds everything the wallet derives from confirmed chain
//! data: the synced tip, the unspent output set, and the event history.
//! State changes arrive only through [`ChainSubscriber::apply_chain_update`],
//! which carries reverted blocks (tip-first) followed by applied blocks
//! (oldest-first). A store must apply the whole update atomically; after a
//! failure its visible state is unchanged.
//!
//! [`MemoryStore`] is the reference implementation. Durable backends
//! implement the same traits.

use parking_lot::Mutex;
use std::collections::HashMap;

use tern_core::types::{ChainIndex, OutputElement, OutputId, StateElement};

use crate::error::StoreError;
use crate::events::Event;

/// One block's worth of wallet-relevant changes being applied.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AppliedBlock {
    /// The block's position in the chain.
    pub index: ChainIndex,
    /// Wallet outputs created by this block.
    pub created: Vec<OutputElement>,
    /// Wallet outputs spent by this block.
    pub spent: Vec<OutputId>,
    /// Wallet events recorded at this block.
    pub events: Vec<Event>,
    /// Refreshed inclusion proofs for outputs that survive this block.
    pub updated: Vec<(OutputId, StateElement)>,
}

/// One block's worth of wallet-relevant changes being undone.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RevertedBlock {
    /// The block being reverted; must equal the store's current tip.
    pub index: ChainIndex,
    /// The block's parent, which becomes the new tip.
    pub parent: ChainIndex,
    /// Outputs the block created; they disappear again.
    pub created: Vec<OutputId>,
    /// Outputs the block spent; they become unspent again.
    pub spent: Vec<OutputElement>,
}

/// An atomic batch of chain changes delivered to subscribers.
///
/// `reverted` is ordered tip-first (the current tip is reverted before its
/// parent); `applied` is ordered oldest-first. A reorg delivers both sides
/// in one update so the store never observes the fork's trough.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ChainUpdate {
    pub reverted: Vec<RevertedBlock>,
    pub applied: Vec<AppliedBlock>,
}

/// Receives chain updates from a chain manager.
pub trait ChainSubscriber: Send + Sync {
    /// Apply a batch of reverted and applied blocks atomically. On error
    /// the subscriber's state must be unchanged and the chain manager will
    /// retry the update later.
    fn apply_chain_update(&self, update: &ChainUpdate) -> Result<(), StoreError>;
}

/// Persistent wallet state.
pub trait Store: ChainSubscriber {
    /// The chain index this store's state reflects.
    fn sync_tip(&self) -> Result<ChainIndex, StoreError>;

    /// All currently unspent wallet outputs.
    fn unspent_outputs(&self) -> Result<Vec<OutputElement>, StoreError>;

    /// A page of the event history, newest first. An offset past the end
    /// yields an empty page.
    fn events(&self, offset: usize, limit: usize) -> Result<Vec<Event>, StoreError>;

    /// Total number of recorded events.
    fn event_count(&self) -> Result<usize, StoreError>;
}

#[derive(Clone, Default)]
struct MemoryState {
    tip: ChainIndex,
    utxos: HashMap<OutputId, OutputElement>,
    events: Vec<Event>,
}

/// In-memory [`Store`], used in tests and as the behavioral reference for
/// durable backends.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_block(state: &mut MemoryState, block: &AppliedBlock) -> Result<(), StoreError> {
    for id in &block.spent {
        if state.utxos.remove(id).is_none() {
            return Err(StoreError::UnknownOutput(*id));
        }
    }
    for element in &block.created {
        // a reorg can re-deliver an output the store already holds
        state.utxos.entry(element.id).or_insert_with(|| element.clone());
    }
    for (id, proof) in &block.updated {
        if let Some(element) = state.utxos.get_mut(id) {
            element.state = proof.clone();
        }
    }
    state.events.extend(block.events.iter().cloned());
    state.tip = block.index;
    Ok(())
}

fn revert_block(state: &mut MemoryState, block: &RevertedBlock) -> Result<(), StoreError> {
    if block.index != state.tip {
        return Err(StoreError::TipMismatch {
            expected: state.tip,
            got: block.index,
        });
    }
    for id in &block.created {
        state.utxos.remove(id);
    }
    for element in &block.spent {
        state.utxos.insert(element.id, element.clone());
    }
    state.events.retain(|event| event.index != block.index);
    state.tip = block.parent;
    Ok(())
}

impl ChainSubscriber for MemoryStore {
    fn apply_chain_update(&self, update: &ChainUpdate) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        // mutate a copy so a mid-update failure leaves the store untouched
        let mut next = inner.clone();
        for block in &update.reverted {
            revert_block(&mut next, block)?;
        }
        for block in &update.applied {
            apply_block(&mut next, block)?;
        }
        *inner = next;
        Ok(())
    }
}

impl Store for MemoryStore {
    fn sync_tip(&self) -> Result<ChainIndex, StoreError> {
        Ok(self.inner.lock().tip)
    }

    fn unspent_outputs(&self) -> Result<Vec<OutputElement>, StoreError> {
        Ok(self.inner.lock().utxos.values().cloned().collect())
    }

    fn events(&self, offset: usize, limit: usize) -> Result<Vec<Event>, StoreError> {
        let inner = self.inner.lock();
        let mut ordered: Vec<Event> = inner.events.iter().rev().cloned().collect();
        ordered.sort_by(|a, b| b.maturity_height.cmp(&a.maturity_height));
        if offset >= ordered.len() {
            return Ok(Vec::new());
        }
        Ok(ordered.into_iter().skip(offset).take(limit).collect())
    }

    fn event_count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.lock().events.len())
    }
}
