//! Wallet events: the per-transaction history entries a store records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use tern_core::currency::Currency;
use tern_core::error::EncodingError;
use tern_core::types::{Address, ChainIndex, Hash256, Output, OutputId, Transaction};

/// What produced an event.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventSource {
    /// An ordinary transaction moving value in or out of the wallet.
    Transfer,
    /// A block reward paid to the wallet's address.
    BlockReward,
    /// The wallet's share of collected transaction fees.
    FeeShare,
    /// A payout released by an on-chain contract resolving.
    ContractResolution,
    /// A protocol-level payout outside normal transactions.
    ProtocolPayout,
}

/// A single entry in the wallet's history.
///
/// Inflow and outflow are from the wallet's perspective: inflow is value
/// received by the wallet's address, outflow is wallet-owned value
/// consumed by the transaction's inputs.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// Transaction id, or a synthetic id for non-transaction sources.
    pub id: Hash256,
    /// Where the event confirmed. Unconfirmed events carry a speculative
    /// index one past the current tip, with a zero block hash.
    pub index: ChainIndex,
    /// The transaction that produced the event.
    pub transaction: Transaction,
    /// Motes received by the wallet.
    pub inflow: Currency,
    /// Wallet-owned motes spent.
    pub outflow: Currency,
    /// What produced this event.
    pub source: EventSource,
    /// Height at which the received value becomes spendable.
    pub maturity_height: u64,
    /// When the event was observed or its block was mined.
    pub timestamp: DateTime<Utc>,
}

/// Whether a transaction touches the wallet's address, on either side.
pub fn is_relevant_transaction(txn: &Transaction, addr: Address) -> bool {
    txn.inputs.iter().any(|input| input.address() == addr)
        || txn.outputs.iter().any(|output| output.address == addr)
}

/// Annotate one pool transaction against the wallet, returning its event
/// if the transaction is relevant.
///
/// `known` maps output ids to outputs the wallet can currently see; it is
/// extended with this transaction's outputs so later pool transactions
/// that chain off it resolve their outflows. Inputs spending outputs not
/// in `known` contribute nothing to the outflow.
pub(crate) fn annotate_pool_transaction(
    txn: &Transaction,
    known: &mut HashMap<OutputId, Output>,
    addr: Address,
    index: ChainIndex,
    timestamp: DateTime<Utc>,
) -> Result<Option<Event>, EncodingError> {
    let relevant = is_relevant_transaction(txn, addr);

    let mut outflow = Currency::ZERO;
    for input in &txn.inputs {
        if let Some(parent) = known.get(&input.parent_id) {
            if parent.address == addr {
                outflow = outflow.checked_add(parent.value).unwrap_or(outflow);
            }
        }
    }
    let mut inflow = Currency::ZERO;
    for (i, output) in txn.outputs.iter().enumerate() {
        known.insert(txn.output_id(i)?, output.clone());
        if output.address == addr {
            inflow = inflow.checked_add(output.value).unwrap_or(inflow);
        }
    }

    if !relevant {
        return Ok(None);
    }
    Ok(Some(Event {
        id: txn.id()?,
        index,
        transaction: txn.clone(),
        inflow,
        outflow,
        source: EventSource::Transfer,
        maturity_height: index.height,
        timestamp,
    }))
}
