//! Wallet-facing chain types: outputs, transactions, chain indexes.
//!
//! All monetary values use [`Currency`] (motes). Output identifiers are
//! deterministic: `output_id(i)` depends only on the signature-stripped
//! transaction encoding, so outputs created by an unconfirmed transaction
//! have the same identifier before and after confirmation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::Currency;
use crate::error::EncodingError;

/// A 32-byte BLAKE3 hash value.
///
/// Used for transaction identifiers, output identifiers, addresses, and
/// block hashes.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The zero hash (32 zero bytes).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a Hash256 from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Unique identifier of a transaction output.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct OutputId(pub Hash256);

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A spend address: the BLAKE3 hash of the owning Ed25519 public key.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Address(pub Hash256);

impl Address {
    /// Derive the address committing to a raw 32-byte public key.
    pub fn from_key_bytes(key: &[u8; 32]) -> Self {
        Self(Hash256(blake3::hash(key).into()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A position in the blockchain: height plus block hash.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct ChainIndex {
    /// Block height.
    pub height: u64,
    /// Block hash at that height.
    pub hash: Hash256,
}

impl fmt::Display for ChainIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.height, self.hash)
    }
}

/// Chain-inclusion proof attached to a stored output.
///
/// The proof is refreshed by chain updates as the accumulator evolves; an
/// unconfirmed (speculative) output carries an empty default element.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct StateElement {
    /// Accumulator leaf position.
    pub leaf_index: u64,
    /// Sibling hashes proving inclusion at `leaf_index`.
    pub merkle_proof: Vec<Hash256>,
}

/// A transaction output: an amount payable to an address.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct Output {
    /// Value in motes.
    pub value: Currency,
    /// Recipient address.
    pub address: Address,
}

/// An unspent output as tracked by a wallet store.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OutputElement {
    /// Deterministic output identifier.
    pub id: OutputId,
    /// Value in motes.
    pub value: Currency,
    /// Owning address.
    pub address: Address,
    /// Height at or after which this output may be spent. An output with
    /// maturity height above the current tip is immature and unspendable.
    pub maturity_height: u64,
    /// Inclusion proof against the current chain state.
    pub state: StateElement,
}

/// A transaction input, spending a previous output.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct Input {
    /// Identifier of the output being spent.
    pub parent_id: OutputId,
    /// Raw Ed25519 public key satisfying the parent's address.
    pub unlock_key: [u8; 32],
}

impl Input {
    /// The address this input's unlock key commits to.
    pub fn address(&self) -> Address {
        Address::from_key_bytes(&self.unlock_key)
    }
}

/// Which parts of a transaction a signature commits to.
///
/// `whole_transaction` covers every field except other signatures; the
/// index lists select individual fields for partial signing.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct CoveredFields {
    /// Commit to the entire transaction (minus signatures).
    pub whole_transaction: bool,
    /// Indices of covered inputs.
    pub inputs: Vec<u64>,
    /// Indices of covered outputs.
    pub outputs: Vec<u64>,
    /// Commit to the miner fee.
    pub miner_fee: bool,
    /// Indices of covered signatures. Also consulted in whole-transaction
    /// mode, where it is the only list that still varies the hash.
    pub signatures: Vec<u64>,
}

impl CoveredFields {
    /// Coverage committing to the whole transaction.
    pub fn whole() -> Self {
        Self {
            whole_transaction: true,
            ..Self::default()
        }
    }
}

/// A signature authorizing one input of a transaction.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct InputSignature {
    /// Identifier of the input's parent output.
    pub parent_id: OutputId,
    /// The fields this signature commits to.
    pub covered: CoveredFields,
    /// Index of the signing key within the unlock policy. The
    /// single-address wallet always uses key 0.
    pub key_index: u64,
    /// Raw 64-byte Ed25519 signature.
    pub signature: Vec<u8>,
}

/// A transaction transferring value between addresses.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Transaction {
    /// Inputs consuming previous outputs.
    pub inputs: Vec<Input>,
    /// New outputs created by this transaction.
    pub outputs: Vec<Output>,
    /// Fee paid to the block producer.
    pub miner_fee: Currency,
    /// Input signatures. Excluded from the transaction identifier.
    pub signatures: Vec<InputSignature>,
}

impl Transaction {
    /// Compute the transaction identifier: BLAKE3 over the canonical
    /// bincode encoding with signatures stripped, so the id is stable
    /// across signing.
    pub fn id(&self) -> Result<Hash256, EncodingError> {
        let unsigned = Transaction {
            signatures: Vec::new(),
            ..self.clone()
        };
        let encoded = bincode::encode_to_vec(&unsigned, bincode::config::standard())
            .map_err(|e| EncodingError::Serialization(e.to_string()))?;
        Ok(Hash256(blake3::hash(&encoded).into()))
    }

    /// Deterministic identifier of the output at `index`:
    /// BLAKE3(txid || index).
    pub fn output_id(&self, index: usize) -> Result<OutputId, EncodingError> {
        let txid = self.id()?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(txid.as_bytes());
        hasher.update(&(index as u64).to_le_bytes());
        Ok(OutputId(Hash256(hasher.finalize().into())))
    }

    /// Sum of all output values plus the miner fee. `None` on overflow.
    pub fn total_output_value(&self) -> Option<Currency> {
        self.outputs
            .iter()
            .try_fold(self.miner_fee, |acc, out| acc.checked_add(out.value))
    }
}
