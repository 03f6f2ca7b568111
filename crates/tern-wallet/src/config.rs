//! Wallet tuning parameters.

use std::time::Duration;

/// Tuning knobs for coin selection and reservations.
///
/// The defaults suit an interactive wallet; batch systems that fund many
/// transactions per block may want a longer reservation duration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletConfig {
    /// Minimum number of spendable outputs before funding opportunistically
    /// sweeps small outputs into a transaction to reduce fragmentation.
    pub defrag_threshold: usize,
    /// Funding skips the defrag sweep entirely once a transaction already
    /// has this many inputs.
    pub max_inputs_for_defrag: usize,
    /// Maximum number of extra small outputs the defrag sweep may add to a
    /// single transaction.
    pub max_defrag_utxos: usize,
    /// How long a funded transaction's inputs stay reserved before other
    /// calls may select them again.
    pub reservation_duration: Duration,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            defrag_threshold: 30,
            max_inputs_for_defrag: 30,
            max_defrag_utxos: 10,
            reservation_duration: Duration::from_secs(15 * 60),
        }
    }
}
