//! 128-bit currency arithmetic.
//!
//! All monetary values are in motes (1 TERN = 10^12 motes). The wallet
//! performs integer arithmetic only; every subtraction that could go
//! negative is checked, because a negative amount always indicates a
//! selection-logic bug rather than a valid state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

use crate::error::CurrencyError;

/// Motes per TERN.
pub const COIN: Currency = Currency::new(1_000_000_000_000);

/// An amount of motes.
///
/// Wraps `u128` so sums over many outputs cannot overflow the native
/// word size. Arithmetic is exclusively checked or explicitly erroring.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Currency(u128);

impl Currency {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Create a currency value from raw motes.
    pub const fn new(motes: u128) -> Self {
        Self(motes)
    }

    /// The raw amount in motes.
    pub const fn motes(&self) -> u128 {
        self.0
    }

    /// Whether this is the zero amount.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition. Returns `None` on overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Checked subtraction. Returns `None` on underflow.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Checked multiplication by a scalar. Returns `None` on overflow.
    pub fn checked_mul(self, rhs: u64) -> Option<Self> {
        self.0.checked_mul(rhs as u128).map(Self)
    }

    /// Erroring addition for accumulation loops.
    pub fn add(self, rhs: Self) -> Result<Self, CurrencyError> {
        self.checked_add(rhs).ok_or(CurrencyError::Overflow)
    }

    /// Erroring subtraction. Underflow means the caller computed an
    /// impossible remainder.
    pub fn sub(self, rhs: Self) -> Result<Self, CurrencyError> {
        self.checked_sub(rhs).ok_or(CurrencyError::Underflow)
    }

    /// The 16-byte little-endian encoding, used in signature hashes.
    pub fn to_le_bytes(self) -> [u8; 16] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Currency {
    fn from(motes: u64) -> Self {
        Self(motes as u128)
    }
}

impl Sum for Currency {
    /// Panics on overflow; use [`Currency::add`] where overflow must be
    /// surfaced as an error.
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, c| {
            Self(acc.0.checked_add(c.0).expect("currency sum overflow"))
        })
    }
}
