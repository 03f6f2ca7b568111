//! Shared test harness: an in-process chain the wallet can subscribe to.

use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use tern_core::crypto::KeyPair;
use tern_core::currency::Currency;
use tern_core::state::TipState;
use tern_core::types::{
    Address, ChainIndex, Hash256, Input, Output, OutputElement, OutputId, StateElement,
    Transaction,
};
use tern_wallet::error::ChainError;
use tern_wallet::{
    AppliedBlock, ChainManager, ChainSubscriber, ChainUpdate, Event, EventSource, MemoryStore,
    RevertedBlock, Wallet, WalletConfig,
};

/// Deterministic test keypair from a seed byte.
pub fn test_key(seed: u8) -> KeyPair {
    KeyPair::from_secret_bytes([seed; 32])
}

struct MinedBlock {
    applied: AppliedBlock,
    parent: ChainIndex,
    spent_elements: Vec<OutputElement>,
}

struct Inner {
    tip: TipState,
    pool: Vec<Transaction>,
    subscribers: Vec<Arc<dyn ChainSubscriber>>,
    /// Wallet outputs currently unspent on chain.
    live: HashMap<OutputId, OutputElement>,
    /// Every output ever confirmed, for outflow accounting.
    known: HashMap<OutputId, Output>,
    history: Vec<MinedBlock>,
    /// Monotonic counter so block hashes stay unique across reorg forks.
    salt: u64,
}

/// A miniature chain for wallet tests.
///
/// Tracks one wallet address: payouts and pool transactions touching that
/// address produce chain updates with created/spent wallet outputs and
/// annotated events. Reverting the tip delivers the inverse update, so
/// subscribed stores exercise the full reorg contract.
pub struct TestChain {
    addr: Address,
    inner: Mutex<Inner>,
}

impl TestChain {
    pub fn new(addr: Address) -> Arc<Self> {
        Arc::new(Self {
            addr,
            inner: Mutex::new(Inner {
                tip: TipState {
                    index: ChainIndex::default(),
                    sig_domain: Hash256([0xD0; 32]),
                },
                pool: Vec::new(),
                subscribers: Vec::new(),
                live: HashMap::new(),
                known: HashMap::new(),
                history: Vec::new(),
                salt: 0,
            }),
        })
    }

    pub fn tip_index(&self) -> ChainIndex {
        self.inner.lock().tip.index
    }

    pub fn add_pool_transaction(&self, txn: Transaction) {
        self.inner.lock().pool.push(txn);
    }

    /// Mine a block containing a payout of `value` to the wallet,
    /// spendable from `maturity_height`. Returns the new output's id.
    pub fn mine_payout(&self, value: Currency, maturity_height: u64) -> OutputId {
        let mut inner = self.inner.lock();
        let index = self.next_index(&mut inner);

        // unique marker input so every payout transaction gets its own id
        let txn = Transaction {
            inputs: vec![Input {
                parent_id: OutputId(Hash256(blake3::hash(&inner.salt.to_le_bytes()).into())),
                unlock_key: [0; 32],
            }],
            outputs: vec![Output {
                value,
                address: self.addr,
            }],
            miner_fee: Currency::ZERO,
            signatures: Vec::new(),
        };
        let id = txn.output_id(0).expect("encode payout");
        let element = OutputElement {
            id,
            value,
            address: self.addr,
            maturity_height,
            state: StateElement::default(),
        };
        let event = Event {
            id: txn.id().expect("encode payout"),
            index,
            transaction: txn,
            inflow: value,
            outflow: Currency::ZERO,
            source: EventSource::BlockReward,
            maturity_height,
            timestamp: Utc::now(),
        };
        let applied = AppliedBlock {
            index,
            created: vec![element],
            spent: Vec::new(),
            events: vec![event],
            updated: Vec::new(),
        };
        self.commit(&mut inner, applied, Vec::new());
        id
    }

    /// Mine a block confirming the current pool contents.
    pub fn mine_pool(&self) {
        let mut inner = self.inner.lock();
        let index = self.next_index(&mut inner);
        let txns = std::mem::take(&mut inner.pool);

        let mut created = Vec::new();
        let mut spent = Vec::new();
        let mut spent_elements = Vec::new();
        let mut events = Vec::new();
        for txn in &txns {
            let mut inflow = Currency::ZERO;
            let mut outflow = Currency::ZERO;
            for input in &txn.inputs {
                if let Some(element) = inner.live.get(&input.parent_id) {
                    outflow = outflow.add(element.value).expect("outflow");
                    spent.push(element.id);
                    spent_elements.push(element.clone());
                }
            }
            for (i, output) in txn.outputs.iter().enumerate() {
                let oid = txn.output_id(i).expect("encode txn");
                inner.known.insert(oid, output.clone());
                if output.address == self.addr {
                    inflow = inflow.add(output.value).expect("inflow");
                    created.push(OutputElement {
                        id: oid,
                        value: output.value,
                        address: output.address,
                        maturity_height: index.height,
                        state: StateElement::default(),
                    });
                }
            }
            if !inflow.is_zero() || !outflow.is_zero() {
                events.push(Event {
                    id: txn.id().expect("encode txn"),
                    index,
                    transaction: txn.clone(),
                    inflow,
                    outflow,
                    source: EventSource::Transfer,
                    maturity_height: index.height,
                    timestamp: Utc::now(),
                });
            }
        }

        let applied = AppliedBlock {
            index,
            created,
            spent,
            events,
            updated: Vec::new(),
        };
        self.commit(&mut inner, applied, spent_elements);
    }

    /// Mine a block with no wallet-relevant content.
    pub fn mine_empty(&self) {
        let mut inner = self.inner.lock();
        let index = self.next_index(&mut inner);
        let applied = AppliedBlock {
            index,
            ..AppliedBlock::default()
        };
        self.commit(&mut inner, applied, Vec::new());
    }

    /// Undo the most recently mined block, delivering the inverse update
    /// to every subscriber.
    pub fn revert_tip(&self) {
        let mut inner = self.inner.lock();
        let block = inner.history.pop().expect("no block to revert");
        for element in &block.applied.created {
            inner.live.remove(&element.id);
        }
        for element in &block.spent_elements {
            inner.live.insert(element.id, element.clone());
        }
        let update = ChainUpdate {
            reverted: vec![RevertedBlock {
                index: block.applied.index,
                parent: block.parent,
                created: block.applied.created.iter().map(|e| e.id).collect(),
                spent: block.spent_elements,
            }],
            applied: Vec::new(),
        };
        for subscriber in &inner.subscribers {
            subscriber
                .apply_chain_update(&update)
                .expect("subscriber rejected revert");
        }
        inner.tip.index = update.reverted[0].parent;
    }

    fn next_index(&self, inner: &mut Inner) -> ChainIndex {
        inner.salt += 1;
        ChainIndex {
            height: inner.tip.index.height + 1,
            hash: Hash256(blake3::hash(&inner.salt.to_be_bytes()).into()),
        }
    }

    fn commit(&self, inner: &mut Inner, applied: AppliedBlock, spent_elements: Vec<OutputElement>) {
        for element in &applied.created {
            inner.live.insert(element.id, element.clone());
            inner.known.insert(
                element.id,
                Output {
                    value: element.value,
                    address: element.address,
                },
            );
        }
        for id in &applied.spent {
            inner.live.remove(id);
        }
        let update = ChainUpdate {
            reverted: Vec::new(),
            applied: vec![applied.clone()],
        };
        for subscriber in &inner.subscribers {
            subscriber
                .apply_chain_update(&update)
                .expect("subscriber rejected block");
        }
        inner.history.push(MinedBlock {
            parent: inner.tip.index,
            applied,
            spent_elements,
        });
        inner.tip.index = update.applied[0].index;
    }
}

impl ChainManager for TestChain {
    fn tip_state(&self) -> TipState {
        self.inner.lock().tip.clone()
    }

    fn pool_transactions(&self) -> Vec<Transaction> {
        self.inner.lock().pool.clone()
    }

    fn subscribe(
        &self,
        subscriber: Arc<dyn ChainSubscriber>,
        from: ChainIndex,
    ) -> Result<(), ChainError> {
        let mut inner = self.inner.lock();
        let missed: Vec<AppliedBlock> = inner
            .history
            .iter()
            .filter(|block| block.applied.index.height > from.height)
            .map(|block| block.applied.clone())
            .collect();
        if !missed.is_empty() {
            subscriber
                .apply_chain_update(&ChainUpdate {
                    reverted: Vec::new(),
                    applied: missed,
                })
                .map_err(|e| ChainError::Subscriber(e.to_string()))?;
        }
        inner.subscribers.push(subscriber);
        Ok(())
    }

    fn unsubscribe(&self, subscriber: &Arc<dyn ChainSubscriber>) {
        self.inner
            .lock()
            .subscribers
            .retain(|s| !Arc::ptr_eq(s, subscriber));
    }
}

/// A wallet wired to a fresh chain and in-memory store.
pub fn setup_wallet(seed: u8) -> (Wallet<MemoryStore>, Arc<TestChain>, Arc<MemoryStore>) {
    setup_wallet_with_config(seed, WalletConfig::default())
}

pub fn setup_wallet_with_config(
    seed: u8,
    cfg: WalletConfig,
) -> (Wallet<MemoryStore>, Arc<TestChain>, Arc<MemoryStore>) {
    let key = test_key(seed);
    let chain = TestChain::new(key.address());
    let store = Arc::new(MemoryStore::new());
    let wallet = Wallet::new(key, chain.clone(), store.clone(), cfg).expect("create wallet");
    (wallet, chain, store)
}
