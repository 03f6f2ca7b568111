//! The single-address wallet.
//!
//! One Ed25519 key, one address. Confirmed state comes from the [`Store`],
//! the pool view comes from the [`ChainManager`], and everything the
//! wallet does is a pure function of those two plus the in-memory
//! reservation table.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

use tern_core::crypto::{KeyPair, PublicKey};
use tern_core::currency::Currency;
use tern_core::error::CurrencyError;
use tern_core::types::{
    Address, ChainIndex, CoveredFields, Hash256, Input, InputSignature, Output, OutputElement,
    OutputId, Transaction,
};

use crate::chain::ChainManager;
use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::events::{annotate_pool_transaction, Event};
use crate::pool::PoolView;
use crate::redistribute::{plan_redistribution, RedistributionPlan};
use crate::reservations::ReservationTable;
use crate::selection::select_funds;
use crate::store::{ChainSubscriber, Store};

/// The wallet's funds, split three ways.
///
/// `spendable` excludes reserved and pool-spent outputs but, like the
/// confirmed total, does not consult maturity: an immature output reads
/// as spendable here even though funding will refuse to select it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Balance {
    /// Confirmed value not reserved or spent by the pool.
    pub spendable: Currency,
    /// Total confirmed value.
    pub confirmed: Currency,
    /// Value of unconfirmed pool outputs paid to the wallet.
    pub unconfirmed: Currency,
}

/// A wallet over a single address.
///
/// All methods take `&self`; the wallet is safe to share across threads
/// and concurrent funding calls never select the same output.
pub struct Wallet<S: Store> {
    key: KeyPair,
    addr: Address,
    cm: Arc<dyn ChainManager>,
    store: Arc<S>,
    cfg: WalletConfig,
    reservations: ReservationTable,
}

impl<S: Store + 'static> Wallet<S> {
    /// Create a wallet and subscribe its store to the chain manager,
    /// resuming from the store's synced tip.
    pub fn new(
        key: KeyPair,
        cm: Arc<dyn ChainManager>,
        store: Arc<S>,
        cfg: WalletConfig,
    ) -> Result<Self, WalletError> {
        let tip = store.sync_tip()?;
        cm.subscribe(store.clone(), tip)?;
        let addr = key.address();
        tracing::debug!(%addr, height = tip.height, "wallet subscribed");
        Ok(Self {
            key,
            addr,
            cm,
            store,
            cfg,
            reservations: ReservationTable::new(),
        })
    }

    /// Detach the store from the chain manager's update feed.
    pub fn close(&self) {
        let subscriber: Arc<dyn ChainSubscriber> = self.store.clone();
        self.cm.unsubscribe(&subscriber);
    }

    /// The wallet's address.
    pub fn address(&self) -> Address {
        self.addr
    }

    /// The public key whose hash is the wallet's address.
    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    /// The chain index the wallet's confirmed state reflects.
    pub fn tip(&self) -> Result<ChainIndex, WalletError> {
        Ok(self.store.sync_tip()?)
    }

    /// Compute the wallet's balance from the store and the pool.
    pub fn balance(&self) -> Result<Balance, WalletError> {
        let utxos = self.store.unspent_outputs()?;
        let pool = PoolView::new(&self.cm.pool_transactions(), self.addr)?;
        let mut reservations = self.reservations.lock();

        let mut balance = Balance::default();
        for utxo in &utxos {
            balance.confirmed = balance.confirmed.add(utxo.value)?;
            if !pool.is_spent(utxo.id) && !reservations.is_locked(utxo.id) {
                balance.spendable = balance.spendable.add(utxo.value)?;
            }
        }
        for element in pool.unspent_created() {
            balance.unconfirmed = balance.unconfirmed.add(element.value)?;
        }
        Ok(balance)
    }

    /// Confirmed outputs usable as inputs right now: mature, not
    /// reserved, and not spent by a pool transaction. Redistribution
    /// draws its candidates from this view.
    pub fn spendable_outputs(&self) -> Result<Vec<OutputElement>, WalletError> {
        let height = self.cm.tip_state().index.height;
        let utxos = self.store.unspent_outputs()?;
        let pool = PoolView::new(&self.cm.pool_transactions(), self.addr)?;
        let mut reservations = self.reservations.lock();
        Ok(utxos
            .into_iter()
            .filter(|utxo| {
                utxo.maturity_height <= height
                    && !pool.is_spent(utxo.id)
                    && !reservations.is_locked(utxo.id)
            })
            .collect())
    }

    /// Add inputs worth at least `amount` to `txn`, plus a change output
    /// when the inputs overshoot. The selected outputs are reserved for
    /// [`WalletConfig::reservation_duration`] and their ids returned;
    /// pass them to [`Wallet::sign_transaction`], or release them with
    /// [`Wallet::release_inputs`] if the transaction is abandoned.
    ///
    /// With `use_unconfirmed`, unconfirmed outputs paid to the wallet may
    /// top up the selection once confirmed funds run out. A zero amount
    /// is a no-op. Candidates follow the spendable-balance view: funding
    /// can select a confirmed output that has not yet matured.
    pub fn fund_transaction(
        &self,
        txn: &mut Transaction,
        amount: Currency,
        use_unconfirmed: bool,
    ) -> Result<Vec<OutputId>, WalletError> {
        if amount.is_zero() {
            return Ok(Vec::new());
        }

        let utxos = self.store.unspent_outputs()?;
        let pool = PoolView::new(&self.cm.pool_transactions(), self.addr)?;

        // selection and reservation happen under one guard so concurrent
        // calls cannot pick the same output. Like the balance computation,
        // candidate filtering here does not consult maturity.
        let mut reservations = self.reservations.lock();
        let confirmed: Vec<OutputElement> = utxos
            .into_iter()
            .filter(|utxo| !pool.is_spent(utxo.id) && !reservations.is_locked(utxo.id))
            .collect();
        let unconfirmed: Vec<OutputElement> = if use_unconfirmed {
            pool.unspent_created()
                .filter(|element| !reservations.is_locked(element.id))
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        let selection = select_funds(confirmed, unconfirmed, amount, txn.inputs.len(), &self.cfg)?;

        let change = selection.total.sub(amount)?;
        if !change.is_zero() {
            txn.outputs.push(Output {
                value: change,
                address: self.addr,
            });
        }
        let unlock_key = self.key.public_key().to_bytes();
        let mut ids = Vec::with_capacity(selection.selected.len());
        for utxo in &selection.selected {
            txn.inputs.push(Input {
                parent_id: utxo.id,
                unlock_key,
            });
            reservations.reserve(utxo.id, self.cfg.reservation_duration);
            ids.push(utxo.id);
        }
        tracing::debug!(%amount, inputs = ids.len(), %change, "funded transaction");
        Ok(ids)
    }

    /// Append one signature per id in `to_sign`, each committing to
    /// `covered`. The ids are those returned by funding; signing does not
    /// verify that they correspond to inputs of `txn`.
    pub fn sign_transaction(
        &self,
        txn: &mut Transaction,
        to_sign: &[OutputId],
        covered: CoveredFields,
    ) -> Result<(), WalletError> {
        let state = self.cm.tip_state();
        for &id in to_sign {
            let hash = state.input_sig_hash(txn, id, 0, &covered)?;
            let signature = self.key.sign(hash.as_bytes());
            txn.signatures.push(InputSignature {
                parent_id: id,
                covered: covered.clone(),
                key_index: 0,
                signature: signature.to_vec(),
            });
        }
        Ok(())
    }

    /// Plan transactions reshaping the wallet's spendable outputs into
    /// `outputs` outputs of exactly `amount` motes. Existing spendable
    /// outputs already at that value count toward the goal. On success
    /// every consumed output is reserved; on failure nothing is.
    pub fn redistribute(
        &self,
        outputs: usize,
        amount: Currency,
        fee_per_byte: Currency,
    ) -> Result<RedistributionPlan, WalletError> {
        let state = self.cm.tip_state();
        let height = state.index.height;
        let utxos = self.store.unspent_outputs()?;
        let pool = PoolView::new(&self.cm.pool_transactions(), self.addr)?;
        let mut reservations = self.reservations.lock();

        let mut wanted = outputs;
        let mut candidates = Vec::new();
        for utxo in utxos {
            if utxo.maturity_height > height
                || pool.is_spent(utxo.id)
                || reservations.is_locked(utxo.id)
            {
                continue;
            }
            if utxo.value == amount {
                wanted = wanted.saturating_sub(1);
                continue;
            }
            candidates.push(utxo);
        }

        let plan = plan_redistribution(
            candidates,
            wanted,
            amount,
            fee_per_byte,
            &state,
            self.addr,
            self.key.public_key().to_bytes(),
        )?;
        for ids in &plan.to_sign {
            for &id in ids {
                reservations.reserve(id, self.cfg.reservation_duration);
            }
        }
        tracing::debug!(
            requested = outputs,
            planned = wanted,
            transactions = plan.transactions.len(),
            "planned redistribution"
        );
        Ok(plan)
    }

    /// Release the reservations held by the inputs of `txns`, making the
    /// outputs selectable again. Releasing unreserved inputs is a no-op.
    pub fn release_inputs(&self, txns: &[Transaction]) {
        let mut reservations = self.reservations.lock();
        for txn in txns {
            for input in &txn.inputs {
                reservations.release(input.parent_id);
            }
        }
    }

    /// A page of the confirmed event history, newest first.
    pub fn events(&self, offset: usize, limit: usize) -> Result<Vec<Event>, WalletError> {
        Ok(self.store.events(offset, limit)?)
    }

    /// Total number of confirmed events.
    pub fn event_count(&self) -> Result<usize, WalletError> {
        Ok(self.store.event_count()?)
    }

    /// Events for pool transactions touching the wallet, annotated as if
    /// they confirmed in the next block.
    pub fn unconfirmed_events(&self) -> Result<Vec<Event>, WalletError> {
        let tip = self.cm.tip_state().index;
        let index = ChainIndex {
            height: tip.height + 1,
            hash: Hash256::ZERO,
        };
        let timestamp = Utc::now();
        let mut known: HashMap<OutputId, Output> = self
            .store
            .unspent_outputs()?
            .into_iter()
            .map(|utxo| {
                (
                    utxo.id,
                    Output {
                        value: utxo.value,
                        address: utxo.address,
                    },
                )
            })
            .collect();
        let mut events = Vec::new();
        for txn in self.cm.pool_transactions() {
            if let Some(event) =
                annotate_pool_transaction(&txn, &mut known, self.addr, index, timestamp)?
            {
                events.push(event);
            }
        }
        Ok(events)
    }
}

/// Sum the values of a slice of outputs.
pub fn sum_outputs(outputs: &[OutputElement]) -> Result<Currency, CurrencyError> {
    outputs
        .iter()
        .try_fold(Currency::ZERO, |acc, utxo| acc.add(utxo.value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::time::Duration;

    use tern_core::state::TipState;
    use tern_core::types::StateElement;

    use crate::error::ChainError;
    use crate::store::{AppliedBlock, ChainUpdate, MemoryStore};

    struct MockChain {
        state: Mutex<TipState>,
        pool: Mutex<Vec<Transaction>>,
    }

    impl MockChain {
        fn at_height(height: u64) -> Arc<Self> {
            Arc::new(Self {
                state: Mutex::new(TipState {
                    index: ChainIndex {
                        height,
                        hash: Hash256([0xCC; 32]),
                    },
                    sig_domain: Hash256([0xDD; 32]),
                }),
                pool: Mutex::new(Vec::new()),
            })
        }

        fn add_pool_transaction(&self, txn: Transaction) {
            self.pool.lock().push(txn);
        }
    }

    impl ChainManager for MockChain {
        fn tip_state(&self) -> TipState {
            self.state.lock().clone()
        }

        fn pool_transactions(&self) -> Vec<Transaction> {
            self.pool.lock().clone()
        }

        fn subscribe(
            &self,
            _subscriber: Arc<dyn ChainSubscriber>,
            _from: ChainIndex,
        ) -> Result<(), ChainError> {
            Ok(())
        }

        fn unsubscribe(&self, _subscriber: &Arc<dyn ChainSubscriber>) {}
    }

    fn element(n: u8, value: u128, addr: Address, maturity: u64) -> OutputElement {
        OutputElement {
            id: OutputId(Hash256([n; 32])),
            value: Currency::new(value),
            address: addr,
            maturity_height: maturity,
            state: StateElement::default(),
        }
    }

    fn seed_store(store: &MemoryStore, height: u64, created: Vec<OutputElement>) {
        store
            .apply_chain_update(&ChainUpdate {
                reverted: vec![],
                applied: vec![AppliedBlock {
                    index: ChainIndex {
                        height,
                        hash: Hash256([height as u8; 32]),
                    },
                    created,
                    ..AppliedBlock::default()
                }],
            })
            .unwrap();
    }

    fn test_wallet(
        cm: Arc<MockChain>,
        utxo_values: &[u128],
    ) -> (Wallet<MemoryStore>, Arc<MemoryStore>) {
        let key = KeyPair::from_secret_bytes([0x42; 32]);
        let addr = key.address();
        let store = Arc::new(MemoryStore::new());
        seed_store(
            &store,
            1,
            utxo_values
                .iter()
                .enumerate()
                .map(|(i, &v)| element(i as u8 + 1, v, addr, 0))
                .collect(),
        );
        let wallet = Wallet::new(key, cm, store.clone(), WalletConfig::default()).unwrap();
        (wallet, store)
    }

    // --- balance ---

    #[test]
    fn balance_splits_confirmed_and_unconfirmed() {
        let cm = MockChain::at_height(10);
        let (wallet, _store) = test_wallet(cm.clone(), &[10, 5]);

        // pool transaction spends the 5 and pays 3 back to the wallet
        cm.add_pool_transaction(Transaction {
            inputs: vec![Input {
                parent_id: OutputId(Hash256([2; 32])),
                unlock_key: wallet.public_key().to_bytes(),
            }],
            outputs: vec![Output {
                value: Currency::new(3),
                address: wallet.address(),
            }],
            miner_fee: Currency::new(2),
            signatures: Vec::new(),
        });

        let balance = wallet.balance().unwrap();
        assert_eq!(balance.confirmed, Currency::new(15));
        assert_eq!(balance.spendable, Currency::new(10));
        assert_eq!(balance.unconfirmed, Currency::new(3));
    }

    #[test]
    fn balance_counts_immature_as_spendable() {
        let cm = MockChain::at_height(10);
        let key = KeyPair::from_secret_bytes([0x42; 32]);
        let addr = key.address();
        let store = Arc::new(MemoryStore::new());
        seed_store(&store, 1, vec![element(1, 50, addr, 100)]);
        let wallet = Wallet::new(key, cm, store, WalletConfig::default()).unwrap();

        let balance = wallet.balance().unwrap();
        assert_eq!(balance.confirmed, Currency::new(50));
        assert_eq!(balance.spendable, Currency::new(50));
        // funding follows the same view and will select the immature
        // output, even though spendable_outputs() filters it
        assert!(wallet.spendable_outputs().unwrap().is_empty());
        let mut txn = Transaction::default();
        assert!(wallet
            .fund_transaction(&mut txn, Currency::new(1), false)
            .is_ok());
    }

    // --- spendable outputs ---

    #[test]
    fn spendable_outputs_filters_immature_and_reserved() {
        let cm = MockChain::at_height(10);
        let key = KeyPair::from_secret_bytes([0x42; 32]);
        let addr = key.address();
        let store = Arc::new(MemoryStore::new());
        seed_store(
            &store,
            1,
            vec![element(1, 10, addr, 0), element(2, 20, addr, 99)],
        );
        let wallet = Wallet::new(key, cm, store, WalletConfig::default()).unwrap();

        let spendable = wallet.spendable_outputs().unwrap();
        assert_eq!(spendable.len(), 1);
        assert_eq!(spendable[0].value, Currency::new(10));

        // reserving both outputs empties the spendable view
        let mut txn = Transaction::default();
        wallet
            .fund_transaction(&mut txn, Currency::new(30), false)
            .unwrap();
        assert!(wallet.spendable_outputs().unwrap().is_empty());
    }

    // --- funding ---

    #[test]
    fn fund_zero_amount_is_noop() {
        let cm = MockChain::at_height(10);
        let (wallet, _store) = test_wallet(cm, &[10]);
        let mut txn = Transaction::default();
        let ids = wallet
            .fund_transaction(&mut txn, Currency::ZERO, false)
            .unwrap();
        assert!(ids.is_empty());
        assert_eq!(txn, Transaction::default());
    }

    #[test]
    fn fund_adds_inputs_and_change() {
        let cm = MockChain::at_height(10);
        let (wallet, _store) = test_wallet(cm, &[10, 5]);
        let mut txn = Transaction::default();
        let ids = wallet
            .fund_transaction(&mut txn, Currency::new(12), false)
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(txn.inputs.len(), 2);
        assert_eq!(txn.outputs.len(), 1);
        assert_eq!(txn.outputs[0].value, Currency::new(3));
        assert_eq!(txn.outputs[0].address, wallet.address());
        assert!(txn
            .inputs
            .iter()
            .all(|i| i.unlock_key == wallet.public_key().to_bytes()));
    }

    #[test]
    fn exact_funding_adds_no_change() {
        let cm = MockChain::at_height(10);
        let (wallet, _store) = test_wallet(cm, &[10, 5]);
        let mut txn = Transaction::default();
        wallet
            .fund_transaction(&mut txn, Currency::new(15), false)
            .unwrap();
        assert!(txn.outputs.is_empty());
    }

    #[test]
    fn funded_outputs_not_reselected() {
        let cm = MockChain::at_height(10);
        let (wallet, _store) = test_wallet(cm, &[10, 5]);

        let mut first = Transaction::default();
        wallet
            .fund_transaction(&mut first, Currency::new(10), false)
            .unwrap();

        let mut second = Transaction::default();
        let err = wallet
            .fund_transaction(&mut second, Currency::new(10), false)
            .unwrap_err();
        assert_eq!(
            err,
            WalletError::NotEnoughFunds {
                have: Currency::new(5),
                need: Currency::new(10),
            }
        );
    }

    #[test]
    fn release_makes_outputs_selectable_again() {
        let cm = MockChain::at_height(10);
        let (wallet, _store) = test_wallet(cm, &[10]);

        let mut txn = Transaction::default();
        wallet
            .fund_transaction(&mut txn, Currency::new(10), false)
            .unwrap();
        wallet.release_inputs(std::slice::from_ref(&txn));
        // releasing twice is harmless
        wallet.release_inputs(std::slice::from_ref(&txn));

        let mut again = Transaction::default();
        let ids = wallet
            .fund_transaction(&mut again, Currency::new(10), false)
            .unwrap();
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn expired_reservations_are_reselectable() {
        let cm = MockChain::at_height(10);
        let key = KeyPair::from_secret_bytes([0x42; 32]);
        let addr = key.address();
        let store = Arc::new(MemoryStore::new());
        seed_store(&store, 1, vec![element(1, 10, addr, 0)]);
        let cfg = WalletConfig {
            reservation_duration: Duration::ZERO,
            ..WalletConfig::default()
        };
        let wallet = Wallet::new(key, cm, store, cfg).unwrap();

        let mut txn = Transaction::default();
        wallet
            .fund_transaction(&mut txn, Currency::new(10), false)
            .unwrap();
        std::thread::sleep(Duration::from_millis(5));

        let mut again = Transaction::default();
        assert!(wallet
            .fund_transaction(&mut again, Currency::new(10), false)
            .is_ok());
    }

    #[test]
    fn unconfirmed_funding_is_opt_in() {
        let cm = MockChain::at_height(10);
        let (wallet, _store) = test_wallet(cm.clone(), &[10]);
        cm.add_pool_transaction(Transaction {
            inputs: vec![],
            outputs: vec![Output {
                value: Currency::new(8),
                address: wallet.address(),
            }],
            miner_fee: Currency::ZERO,
            signatures: Vec::new(),
        });

        let mut txn = Transaction::default();
        let err = wallet
            .fund_transaction(&mut txn, Currency::new(15), false)
            .unwrap_err();
        assert!(matches!(err, WalletError::NotEnoughFunds { .. }));

        let ids = wallet
            .fund_transaction(&mut txn, Currency::new(15), true)
            .unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn pool_spent_outputs_excluded_from_funding() {
        let cm = MockChain::at_height(10);
        let (wallet, _store) = test_wallet(cm.clone(), &[10]);
        cm.add_pool_transaction(Transaction {
            inputs: vec![Input {
                parent_id: OutputId(Hash256([1; 32])),
                unlock_key: wallet.public_key().to_bytes(),
            }],
            outputs: vec![],
            miner_fee: Currency::ZERO,
            signatures: Vec::new(),
        });
        let mut txn = Transaction::default();
        assert!(matches!(
            wallet.fund_transaction(&mut txn, Currency::new(1), false),
            Err(WalletError::NotEnoughFunds { .. })
        ));
    }

    // --- signing ---

    #[test]
    fn sign_whole_transaction_verifies() {
        let cm = MockChain::at_height(10);
        let (wallet, _store) = test_wallet(cm.clone(), &[10, 5]);
        let mut txn = Transaction {
            outputs: vec![Output {
                value: Currency::new(12),
                address: Address(Hash256([9; 32])),
            }],
            ..Transaction::default()
        };
        let ids = wallet
            .fund_transaction(&mut txn, Currency::new(12), false)
            .unwrap();
        wallet
            .sign_transaction(&mut txn, &ids, CoveredFields::whole())
            .unwrap();
        assert_eq!(txn.signatures.len(), 2);

        let state = cm.tip_state();
        for sig in &txn.signatures {
            assert_eq!(sig.key_index, 0);
            let hash = state.whole_sig_hash(&txn, sig.parent_id, 0, &[]);
            let bytes: [u8; 64] = sig.signature.as_slice().try_into().unwrap();
            wallet
                .public_key()
                .verify(hash.as_bytes(), &bytes)
                .unwrap();
        }
    }

    #[test]
    fn sign_partial_covered_fields() {
        let cm = MockChain::at_height(10);
        let (wallet, _store) = test_wallet(cm.clone(), &[10]);
        let mut txn = Transaction::default();
        let ids = wallet
            .fund_transaction(&mut txn, Currency::new(10), false)
            .unwrap();
        let covered = CoveredFields {
            inputs: vec![0],
            miner_fee: true,
            ..CoveredFields::default()
        };
        wallet
            .sign_transaction(&mut txn, &ids, covered.clone())
            .unwrap();

        let state = cm.tip_state();
        let hash = state.partial_sig_hash(&txn, &covered).unwrap();
        let bytes: [u8; 64] = txn.signatures[0].signature.as_slice().try_into().unwrap();
        wallet.public_key().verify(hash.as_bytes(), &bytes).unwrap();
    }

    #[test]
    fn sign_partial_out_of_bounds_fails() {
        let cm = MockChain::at_height(10);
        let (wallet, _store) = test_wallet(cm, &[10]);
        let mut txn = Transaction::default();
        let ids = wallet
            .fund_transaction(&mut txn, Currency::new(10), false)
            .unwrap();
        let covered = CoveredFields {
            outputs: vec![5],
            ..CoveredFields::default()
        };
        assert!(wallet.sign_transaction(&mut txn, &ids, covered).is_err());
        assert!(txn.signatures.is_empty());
    }

    // --- redistribution ---

    #[test]
    fn redistribute_reserves_consumed_outputs() {
        let cm = MockChain::at_height(10);
        let (wallet, _store) = test_wallet(cm, &[1_000]);
        let plan = wallet
            .redistribute(3, Currency::new(100), Currency::ZERO)
            .unwrap();
        assert_eq!(plan.transactions.len(), 1);

        // the consumed output is reserved until the plan is released
        let mut txn = Transaction::default();
        assert!(matches!(
            wallet.fund_transaction(&mut txn, Currency::new(1), false),
            Err(WalletError::NotEnoughFunds { .. })
        ));
        wallet.release_inputs(&plan.transactions);
        assert!(wallet
            .fund_transaction(&mut txn, Currency::new(1), false)
            .is_ok());
    }

    #[test]
    fn redistribute_counts_existing_outputs() {
        let cm = MockChain::at_height(10);
        let (wallet, _store) = test_wallet(cm, &[100, 1_000]);
        // one output already holds exactly 100, so only one more is needed
        let plan = wallet
            .redistribute(2, Currency::new(100), Currency::ZERO)
            .unwrap();
        assert_eq!(plan.transactions.len(), 1);
        let uniform = plan.transactions[0]
            .outputs
            .iter()
            .filter(|o| o.value == Currency::new(100))
            .count();
        assert_eq!(uniform, 1);
    }

    #[test]
    fn redistribute_satisfied_without_transactions() {
        let cm = MockChain::at_height(10);
        let (wallet, _store) = test_wallet(cm, &[100, 100]);
        let plan = wallet
            .redistribute(2, Currency::new(100), Currency::ZERO)
            .unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn failed_redistribute_reserves_nothing() {
        let cm = MockChain::at_height(10);
        let (wallet, _store) = test_wallet(cm, &[50]);
        let err = wallet
            .redistribute(5, Currency::new(100), Currency::ZERO)
            .unwrap_err();
        assert!(matches!(err, WalletError::NotEnoughFunds { .. }));

        // the candidate was not reserved by the failed attempt
        let mut txn = Transaction::default();
        assert!(wallet
            .fund_transaction(&mut txn, Currency::new(50), false)
            .is_ok());
    }

    // --- events ---

    #[test]
    fn unconfirmed_events_annotate_pool() {
        let cm = MockChain::at_height(10);
        let (wallet, _store) = test_wallet(cm.clone(), &[10, 5]);
        cm.add_pool_transaction(Transaction {
            inputs: vec![Input {
                parent_id: OutputId(Hash256([2; 32])),
                unlock_key: wallet.public_key().to_bytes(),
            }],
            outputs: vec![Output {
                value: Currency::new(3),
                address: wallet.address(),
            }],
            miner_fee: Currency::new(2),
            signatures: Vec::new(),
        });
        // unrelated pool traffic is skipped
        cm.add_pool_transaction(Transaction {
            outputs: vec![Output {
                value: Currency::new(7),
                address: Address(Hash256([0x77; 32])),
            }],
            ..Transaction::default()
        });

        let events = wallet.unconfirmed_events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].inflow, Currency::new(3));
        assert_eq!(events[0].outflow, Currency::new(5));
        assert_eq!(events[0].index.height, 11);
        assert!(events[0].index.hash.is_zero());
    }

    #[test]
    fn sum_outputs_totals_values() {
        let addr = Address(Hash256([1; 32]));
        let outputs = vec![element(1, 4, addr, 0), element(2, 6, addr, 0)];
        assert_eq!(sum_outputs(&outputs).unwrap(), Currency::new(10));
        assert_eq!(sum_outputs(&[]).unwrap(), Currency::ZERO);
    }
}
