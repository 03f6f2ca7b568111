//! Chain state consulted when constructing and signing transactions.
//!
//! [`TipState`] pairs the current tip index with the network's signature
//! domain separator, and computes the two input signing hashes: the
//! whole-transaction hash and the partial covered-fields hash.

use crate::currency::Currency;
use crate::error::{CryptoError, EncodingError};
use crate::types::{ChainIndex, CoveredFields, Hash256, OutputId, Transaction};

const WHOLE_SIG_PREFIX: &[u8] = b"tern/sig/whole";
const PARTIAL_SIG_PREFIX: &[u8] = b"tern/sig/partial";

/// Consensus state at the current chain tip.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TipState {
    /// The tip's height and block hash.
    pub index: ChainIndex,
    /// Network-specific domain separator mixed into every signing hash,
    /// preventing signature replay across networks.
    pub sig_domain: Hash256,
}

impl TipState {
    /// Encoded size of a transaction in bytes, used for fee estimation.
    pub fn transaction_weight(&self, txn: &Transaction) -> Result<u64, EncodingError> {
        let encoded = bincode::encode_to_vec(txn, bincode::config::standard())
            .map_err(|e| EncodingError::Serialization(e.to_string()))?;
        Ok(encoded.len() as u64)
    }

    /// Signing hash committing to the whole transaction.
    ///
    /// Covers every input, every output, and the miner fee, but no
    /// signatures, so inputs can be signed in any order. The parent id and
    /// key index bind each signature to one specific input, and
    /// `covered_sigs` lets a signer additionally commit to signature slots.
    pub fn whole_sig_hash(
        &self,
        txn: &Transaction,
        parent_id: OutputId,
        key_index: u64,
        covered_sigs: &[u64],
    ) -> Hash256 {
        let mut data = Vec::new();
        data.extend_from_slice(WHOLE_SIG_PREFIX);
        data.extend_from_slice(self.sig_domain.as_bytes());

        data.extend_from_slice(&(txn.inputs.len() as u64).to_le_bytes());
        for input in &txn.inputs {
            data.extend_from_slice(input.parent_id.0.as_bytes());
            data.extend_from_slice(&input.unlock_key);
        }
        data.extend_from_slice(&(txn.outputs.len() as u64).to_le_bytes());
        for output in &txn.outputs {
            data.extend_from_slice(&output.value.to_le_bytes());
            data.extend_from_slice(output.address.0.as_bytes());
        }
        data.extend_from_slice(&txn.miner_fee.to_le_bytes());

        data.extend_from_slice(parent_id.0.as_bytes());
        data.extend_from_slice(&key_index.to_le_bytes());
        data.extend_from_slice(&(covered_sigs.len() as u64).to_le_bytes());
        for &i in covered_sigs {
            data.extend_from_slice(&i.to_le_bytes());
        }

        Hash256(blake3::hash(&data).into())
    }

    /// Signing hash committing to an explicit subset of transaction fields.
    ///
    /// Every listed index must be in bounds for the transaction; an index
    /// past the end of its field fails with
    /// [`CryptoError::CoveredFieldOutOfBounds`].
    pub fn partial_sig_hash(
        &self,
        txn: &Transaction,
        covered: &CoveredFields,
    ) -> Result<Hash256, CryptoError> {
        check_indices("inputs", &covered.inputs, txn.inputs.len())?;
        check_indices("outputs", &covered.outputs, txn.outputs.len())?;
        check_indices("signatures", &covered.signatures, txn.signatures.len())?;

        let mut data = Vec::new();
        data.extend_from_slice(PARTIAL_SIG_PREFIX);
        data.extend_from_slice(self.sig_domain.as_bytes());

        data.extend_from_slice(&(covered.inputs.len() as u64).to_le_bytes());
        for &i in &covered.inputs {
            let input = &txn.inputs[i as usize];
            data.extend_from_slice(&i.to_le_bytes());
            data.extend_from_slice(input.parent_id.0.as_bytes());
            data.extend_from_slice(&input.unlock_key);
        }
        data.extend_from_slice(&(covered.outputs.len() as u64).to_le_bytes());
        for &i in &covered.outputs {
            let output = &txn.outputs[i as usize];
            data.extend_from_slice(&i.to_le_bytes());
            data.extend_from_slice(&output.value.to_le_bytes());
            data.extend_from_slice(output.address.0.as_bytes());
        }
        if covered.miner_fee {
            data.push(1);
            data.extend_from_slice(&txn.miner_fee.to_le_bytes());
        } else {
            data.push(0);
        }
        data.extend_from_slice(&(covered.signatures.len() as u64).to_le_bytes());
        for &i in &covered.signatures {
            let sig = &txn.signatures[i as usize];
            data.extend_from_slice(&i.to_le_bytes());
            data.extend_from_slice(sig.parent_id.0.as_bytes());
            data.extend_from_slice(&sig.key_index.to_le_bytes());
            data.extend_from_slice(&sig.signature);
        }

        Ok(Hash256(blake3::hash(&data).into()))
    }

    /// Signing hash for an input signature, dispatching on its covered
    /// fields: whole-transaction mode or partial mode.
    pub fn input_sig_hash(
        &self,
        txn: &Transaction,
        parent_id: OutputId,
        key_index: u64,
        covered: &CoveredFields,
    ) -> Result<Hash256, CryptoError> {
        if covered.whole_transaction {
            Ok(self.whole_sig_hash(txn, parent_id, key_index, &covered.signatures))
        } else {
            self.partial_sig_hash(txn, covered)
        }
    }
}

fn check_indices(field: &'static str, indices: &[u64], len: usize) -> Result<(), CryptoError> {
    for &i in indices {
        if i as usize >= len {
            return Err(CryptoError::CoveredFieldOutOfBounds { field, index: i });
        }
    }
    Ok(())
}

/// Fee for a transaction at a given per-byte rate. `None` on overflow.
pub fn fee_for_weight(fee_per_byte: Currency, weight: u64) -> Option<Currency> {
    fee_per_byte.checked_mul(weight)
}
