//! Coin selection: choosing which unspent outputs fund a transaction.
//!
//! Selection is largest-first. Spending big outputs first keeps input
//! counts (and therefore fees) low, and leaves the long tail of dust for
//! the defrag sweep, which opportunistically folds small outputs into
//! transactions that are being built anyway.

use tern_core::currency::Currency;
use tern_core::types::OutputElement;

use crate::config::WalletConfig;
use crate::error::WalletError;

/// The outcome of coin selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Outputs chosen to fund the transaction, confirmed before
    /// unconfirmed, largest first within each group.
    pub selected: Vec<OutputElement>,
    /// Sum of the selected output values. Always covers the requested
    /// amount; the excess becomes change.
    pub total: Currency,
}

/// Select outputs worth at least `target` motes.
///
/// Confirmed outputs are preferred; `unconfirmed` outputs top up the
/// selection only when confirmed funds alone cannot cover the target.
/// When many confirmed outputs remain unselected, the defrag sweep adds up
/// to [`WalletConfig::max_defrag_utxos`] of the smallest ones, provided the
/// transaction (including `existing_inputs` already on it) stays under
/// [`WalletConfig::max_inputs_for_defrag`] inputs.
pub fn select_funds(
    mut confirmed: Vec<OutputElement>,
    mut unconfirmed: Vec<OutputElement>,
    target: Currency,
    existing_inputs: usize,
    cfg: &WalletConfig,
) -> Result<Selection, WalletError> {
    confirmed.sort_by(|a, b| b.value.cmp(&a.value));

    let mut selected = Vec::new();
    let mut remaining = Vec::new();
    let mut total = Currency::ZERO;
    for utxo in confirmed {
        if total >= target {
            remaining.push(utxo);
            continue;
        }
        total = total.add(utxo.value)?;
        selected.push(utxo);
    }

    if total < target {
        unconfirmed.sort_by(|a, b| b.value.cmp(&a.value));
        for utxo in unconfirmed {
            if total >= target {
                break;
            }
            total = total.add(utxo.value)?;
            selected.push(utxo);
        }
    }

    if total < target {
        return Err(WalletError::NotEnoughFunds {
            have: total,
            need: target,
        });
    }

    // `remaining` is still sorted descending, so popping takes the
    // smallest outputs first.
    if remaining.len() > cfg.defrag_threshold {
        let mut swept = 0;
        while swept < cfg.max_defrag_utxos
            && existing_inputs + selected.len() < cfg.max_inputs_for_defrag
        {
            let Some(utxo) = remaining.pop() else { break };
            total = total.add(utxo.value)?;
            selected.push(utxo);
            swept += 1;
        }
    }

    Ok(Selection { selected, total })
}
