//! Money Module
//!
//! Fixed-point representation of account balances and transfer amounts.
//! All arithmetic on balances MUST go through [`Amount`].
//!
//! ## Internal Representation
//! - Amounts are stored as `i64` minor units (cents), `BIGINT` in PostgreSQL
//! - The scale factor is `10^SCALE` (2 decimal places)
//! - Arithmetic is checked; overflow is an error, never a wrap
//!
//! ## Usage
//! ```rust
//! use pg_transfer::money::Amount;
//!
//! let amount: Amount = "1.5".parse().unwrap();
//! assert_eq!(amount.minor(), 150);
//! assert_eq!(amount.to_string(), "1.50");
//! ```

use rust_decimal::prelude::*;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Decimal places carried by every [`Amount`]
pub const SCALE: u32 = 2;

/// Minor units per major unit (`10^SCALE`)
pub const MINOR_PER_MAJOR: i64 = 100;

// ============================================================================
// Error Types
// ============================================================================

/// Money conversion errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must not be negative")]
    Negative,

    #[error("Amount too large, would overflow")]
    Overflow,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

// ============================================================================
// Amount
// ============================================================================

/// Fixed-point monetary amount in minor units
///
/// Maps to a `BIGINT` column through `sqlx(transparent)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Build from raw minor units (cents)
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Build from whole major units, e.g. `from_major(800)` is `800.00`
    ///
    /// # Panics
    /// If `units * 100` does not fit in `i64`. Use [`Amount::checked_from_major`]
    /// for untrusted input.
    #[inline]
    pub const fn from_major(units: i64) -> Self {
        match Self::checked_from_major(units) {
            Some(amount) => amount,
            None => panic!("Amount::from_major overflows i64 minor units"),
        }
    }

    /// Whole major units, or `None` if the minor-unit value overflows
    #[inline]
    pub const fn checked_from_major(units: i64) -> Option<Self> {
        match units.checked_mul(MINOR_PER_MAJOR) {
            Some(minor) => Some(Self(minor)),
            None => None,
        }
    }

    /// Raw minor units
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Exact decimal view, e.g. `Decimal` 800.00 for 80000 minor units
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, SCALE)
    }

    /// Convert a decimal into minor units without rounding
    ///
    /// # Errors
    /// * `Negative` - if the value is below zero
    /// * `PrecisionOverflow` - if it carries more than [`SCALE`] decimals
    /// * `Overflow` - if it does not fit into `i64` minor units
    pub fn try_from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(MoneyError::Negative);
        }

        let provided = value.normalize().scale();
        if provided > SCALE {
            return Err(MoneyError::PrecisionOverflow {
                provided,
                max: SCALE,
            });
        }

        value
            .checked_mul(Decimal::from(MINOR_PER_MAJOR))
            .and_then(|scaled| scaled.to_i64())
            .map(Amount)
            .ok_or(MoneyError::Overflow)
    }
}

impl FromStr for Amount {
    type Err = MoneyError;

    /// Parse a client-facing decimal string ("200", "1000.50")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MoneyError::InvalidFormat("empty string".into()));
        }
        if s.starts_with('-') {
            return Err(MoneyError::Negative);
        }
        if s.starts_with('+') || s.starts_with('.') || s.ends_with('.') {
            return Err(MoneyError::InvalidFormat(s.to_string()));
        }

        let value = Decimal::from_str(s).map_err(|e| MoneyError::InvalidFormat(e.to_string()))?;
        Self::try_from_decimal(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.to_decimal()
    }
}
