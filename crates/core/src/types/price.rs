//! Type-safe price representation using decimal arithmetic.
//!
//! Every catalog price is in US dollars. A product with no price is shown as
//! "Price on request" and treated as zero by the catalog filters.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Label shown for products without a usable price.
pub const PRICE_ON_REQUEST: &str = "Price on request";

/// A price in US dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price from a dollar amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The dollar amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount used for filtering and sorting: a missing price counts as zero.
    #[must_use]
    pub fn effective(price: Option<Self>) -> Decimal {
        price.map_or(Decimal::ZERO, |p| p.0)
    }

    /// Display label for an optional price.
    ///
    /// Missing and zero prices both read "Price on request".
    #[must_use]
    pub fn label(price: Option<Self>) -> String {
        match price {
            Some(p) if !p.0.is_zero() => p.to_string(),
            _ => PRICE_ON_REQUEST.to_string(),
        }
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Price {
    /// Formats as en-US currency, e.g. `$1,234.50`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp(2);
        let text = format!("{:.2}", rounded.abs());
        let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        write!(f, "{sign}${grouped}.{cents}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(s: &str) -> Price {
        Price::new(s.parse().unwrap())
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(price("1234.5").to_string(), "$1,234.50");
        assert_eq!(price("1000000").to_string(), "$1,000,000.00");
        assert_eq!(price("999.999").to_string(), "$1,000.00");
        assert_eq!(price("12").to_string(), "$12.00");
    }

    #[test]
    fn test_label_price_on_request() {
        assert_eq!(Price::label(None), PRICE_ON_REQUEST);
        assert_eq!(Price::label(Some(Price::ZERO)), PRICE_ON_REQUEST);
        assert_eq!(Price::label(Some(price("250"))), "$250.00");
    }

    #[test]
    fn test_effective_missing_is_zero() {
        assert_eq!(Price::effective(None), Decimal::ZERO);
        assert_eq!(Price::effective(Some(price("42.10"))), price("42.10").amount());
    }

    #[test]
    fn test_deserializes_from_json_number() {
        let p: Price = serde_json::from_str("199.99").unwrap();
        assert_eq!(p, price("199.99"));
        assert_eq!(serde_json::to_string(&p).unwrap(), "199.99");
    }
}
