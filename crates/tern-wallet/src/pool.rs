//! Snapshot of the transaction pool from the wallet's perspective.

use std::collections::{HashMap, HashSet};

use tern_core::error::EncodingError;
use tern_core::types::{Address, OutputElement, OutputId, StateElement, Transaction};

/// Outputs spent and created by the current pool contents.
///
/// Created outputs are speculative: they carry no inclusion proof and a
/// maturity height of zero, and only outputs paid to the wallet's own
/// address are tracked.
pub(crate) struct PoolView {
    spent: HashSet<OutputId>,
    created: HashMap<OutputId, OutputElement>,
}

impl PoolView {
    pub fn new(txns: &[Transaction], addr: Address) -> Result<Self, EncodingError> {
        let mut spent = HashSet::new();
        let mut created = HashMap::new();
        for txn in txns {
            for input in &txn.inputs {
                spent.insert(input.parent_id);
            }
            for (i, output) in txn.outputs.iter().enumerate() {
                if output.address != addr {
                    continue;
                }
                let id = txn.output_id(i)?;
                created.insert(
                    id,
                    OutputElement {
                        id,
                        value: output.value,
                        address: output.address,
                        maturity_height: 0,
                        state: StateElement::default(),
                    },
                );
            }
        }
        Ok(Self { spent, created })
    }

    /// Whether a confirmed output is consumed by a pool transaction.
    pub fn is_spent(&self, id: OutputId) -> bool {
        self.spent.contains(&id)
    }

    /// Unconfirmed wallet outputs created by the pool, excluding those a
    /// later pool transaction already spends.
    pub fn unspent_created(&self) -> impl Iterator<Item = &OutputElement> {
        self.created
            .values()
            .filter(|element| !self.spent.contains(&element.id))
    }
}
