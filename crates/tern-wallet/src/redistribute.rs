//! Redistribution: reshaping the wallet's UTXO set into uniform outputs.
//!
//! Hosts and other high-throughput users want many same-valued outputs so
//! concurrent transactions never contend for funding. Planning is pure:
//! the caller supplies the candidate outputs and receives unsigned
//! transactions plus per-transaction signing lists, and decides itself
//! when to reserve the consumed outputs.

use std::collections::VecDeque;

use tern_core::currency::Currency;
use tern_core::error::CurrencyError;
use tern_core::state::{fee_for_weight, TipState};
use tern_core::types::{Address, Input, Output, OutputElement, OutputId, Transaction};

use crate::error::WalletError;

/// Maximum requested outputs created per transaction.
pub const REDISTRIBUTE_BATCH_SIZE: usize = 10;

/// Marginal encoded size of one signed input, for fee estimation before
/// the inputs are attached.
const BYTES_PER_INPUT: u64 = 180;

/// Unsigned redistribution transactions and the output ids each one
/// spends. `to_sign[i]` lists the inputs of `transactions[i]`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RedistributionPlan {
    pub transactions: Vec<Transaction>,
    pub to_sign: Vec<Vec<OutputId>>,
}

impl RedistributionPlan {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Plan transactions creating `outputs` new outputs of `amount` motes
/// each, paid back to `addr` and funded from `candidates`.
///
/// Candidates must already exclude reserved outputs and outputs whose
/// value equals `amount` (those count toward the goal as-is). Each
/// transaction's fee covers its encoded weight plus a per-input estimate,
/// and any excess input value returns to `addr` as change.
pub fn plan_redistribution(
    candidates: Vec<OutputElement>,
    outputs: usize,
    amount: Currency,
    fee_per_byte: Currency,
    state: &TipState,
    addr: Address,
    unlock_key: [u8; 32],
) -> Result<RedistributionPlan, WalletError> {
    let mut plan = RedistributionPlan::default();
    if outputs == 0 || amount.is_zero() {
        return Ok(plan);
    }

    let mut pool: VecDeque<OutputElement> = {
        let mut sorted = candidates;
        sorted.sort_by(|a, b| b.value.cmp(&a.value));
        sorted.into()
    };
    let fee_per_input = fee_per_byte
        .checked_mul(BYTES_PER_INPUT)
        .ok_or(CurrencyError::Overflow)?;

    let mut remaining = outputs;
    while remaining > 0 {
        let batch = remaining.min(REDISTRIBUTE_BATCH_SIZE);
        remaining -= batch;

        let mut txn = Transaction {
            outputs: vec![
                Output {
                    value: amount,
                    address: addr,
                };
                batch
            ],
            ..Transaction::default()
        };
        let base_fee = fee_for_weight(fee_per_byte, state.transaction_weight(&txn)?)
            .ok_or(CurrencyError::Overflow)?;
        let target = amount
            .checked_mul(batch as u64)
            .ok_or(CurrencyError::Overflow)?;

        let mut selected: Vec<OutputElement> = Vec::new();
        let mut total = Currency::ZERO;
        let mut fee = base_fee;
        let mut need = target.add(fee)?;
        while total < need {
            let Some(utxo) = pool.pop_front() else {
                return Err(WalletError::NotEnoughFunds {
                    have: total,
                    need,
                });
            };
            total = total.add(utxo.value)?;
            selected.push(utxo);
            let input_fees = fee_per_input
                .checked_mul(selected.len() as u64)
                .ok_or(CurrencyError::Overflow)?;
            fee = base_fee.add(input_fees)?;
            need = target.add(fee)?;
        }

        txn.miner_fee = fee;
        let change = total.sub(need)?;
        if !change.is_zero() {
            txn.outputs.push(Output {
                value: change,
                address: addr,
            });
        }
        let mut ids = Vec::with_capacity(selected.len());
        for utxo in &selected {
            txn.inputs.push(Input {
                parent_id: utxo.id,
                unlock_key,
            });
            ids.push(utxo.id);
        }

        plan.transactions.push(txn);
        plan.to_sign.push(ids);
    }

    Ok(plan)
}
