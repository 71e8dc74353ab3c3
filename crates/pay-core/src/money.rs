//! # Money
//!
//! Canonical `{amount, currencyCode}` representation sent to the gateway.
//!
//! Zero-decimal currencies (JPY) are rounded to whole units and emitted as
//! JSON integers. Every other currency keeps the amount exactly as given.

use serde::{Deserialize, Serialize};

/// Currencies the gateway expects without minor units
pub const ZERO_DECIMAL_CURRENCIES: &[&str] = &["JPY"];

/// Amount as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    /// Whole units (zero-decimal currencies)
    Whole(i64),
    /// Decimal amount, unrounded
    Decimal(f64),
}

impl Amount {
    /// Get the amount as a float
    pub fn as_f64(&self) -> f64 {
        match *self {
            Amount::Whole(v) => v as f64,
            Amount::Decimal(v) => v,
        }
    }

    /// True for finite, non-negative amounts
    pub fn is_chargeable(&self) -> bool {
        let v = self.as_f64();
        v.is_finite() && v >= 0.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Amount::Whole(v) => write!(f, "{}", v),
            Amount::Decimal(v) => write!(f, "{}", v),
        }
    }
}

/// Price in the gateway's canonical shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: Amount,
    pub currency_code: String,
}

impl Money {
    /// Build a price, applying the currency's rounding rule.
    ///
    /// Currency codes are not validated; the gateway rejects unknown ones.
    pub fn new(amount: f64, currency_code: impl Into<String>) -> Self {
        let currency_code = currency_code.into();
        let amount = if is_zero_decimal(&currency_code) {
            // f64::round is half away from zero
            Amount::Whole(amount.round() as i64)
        } else {
            Amount::Decimal(amount)
        };
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for logs (e.g., "19.99 USD")
    pub fn display(&self) -> String {
        format!("{} {}", self.amount, self.currency_code)
    }
}

/// Like `create_price`, but `None` for amounts that cannot be charged:
/// non-finite, negative, or too large for whole units.
pub fn checked_price(amount: f64, currency_code: &str) -> Option<Money> {
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if is_zero_decimal(currency_code) && amount.round() >= i64::MAX as f64 {
        return None;
    }
    Some(Money::new(amount, currency_code))
}

/// Shorthand for `Money::new`
pub fn create_price(amount: f64, currency_code: &str) -> Money {
    Money::new(amount, currency_code)
}

fn is_zero_decimal(currency_code: &str) -> bool {
    ZERO_DECIMAL_CURRENCIES.contains(&currency_code)
}
