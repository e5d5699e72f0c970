//! Monetary amounts.
//!
//! Amounts are exact decimals (USDT-denominated units). Journal entries carry
//! signed amounts; everything else is positive by invariant.

use rust_decimal::Decimal;

/// Monetary amount in platform units.
pub type Amount = Decimal;

/// Whole-unit amount (e.g. thresholds from configuration).
pub fn units(n: u64) -> Amount {
    Decimal::from(n)
}
