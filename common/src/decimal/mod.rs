//! Decimal type utilities for exact money arithmetic

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
pub use rust_decimal_macros::dec;

use crate::error::{Error, Result};

/// Monetary amount with exact decimal arithmetic
pub type Amount = Decimal;

/// Precision helpers for money values
pub mod precision {
    use super::*;

    /// Fractional digits carried by balances and amounts
    pub const MONEY_SCALE: u32 = 2;

    /// Largest balance a `NUMERIC(18, 2)` column holds
    pub const MAX_MONEY: Amount = dec!(9999999999999999.99);

    /// Round to money precision and pin the scale so `1500` renders as `1500.00`
    pub fn round_money(amount: Amount) -> Amount {
        let mut rounded = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven);
        rounded.rescale(MONEY_SCALE);
        rounded
    }

    /// True if the magnitude fits the storable money range
    pub fn within_money_range(amount: Amount) -> bool {
        amount.abs() <= MAX_MONEY
    }

    /// True if the amount has no more than two significant fractional digits
    pub fn has_money_precision(amount: Amount) -> bool {
        amount.normalize().scale() <= MONEY_SCALE
    }
}

/// Parse a stored balance into an amount.
///
/// Persistence layers may hand decimal columns back as text; this is the one
/// place that text becomes a number.
pub fn parse_amount(raw: &str) -> Result<Amount> {
    let trimmed = raw.trim();
    let value = Decimal::from_str(trimmed)
        .map_err(|e| Error::DecimalError(format!("Invalid amount '{}': {}", trimmed, e)))?;
    Ok(precision::round_money(value))
}
