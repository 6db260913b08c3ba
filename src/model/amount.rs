//! Amount type for handling monetary values that may carry a currency symbol.
//!
//! Sheet cells are read as formatted values, so a value cell may look like `₹1,50,000`, `$2,500.00`
//! or ` 1200 `. `Amount` strips the decoration and keeps a `Decimal`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Currency symbols that are tolerated in front of a number.
const CURRENCY_SYMBOLS: [char; 4] = ['$', '₹', '€', '£'];

/// Represents a monetary amount.
///
/// # Examples
///
/// ```
/// # use networth_tracker::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("₹1,500.75").unwrap();
/// assert_eq!(amount.to_string(), "1500.75");
/// assert_eq!(amount.display("₹"), "₹1,501");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn is_negative(&self) -> bool {
        self.value.is_sign_negative() && !self.value.is_zero()
    }

    /// Formats the amount for a KPI card: the `symbol` in front, thousands separators and no
    /// decimal places, e.g. `-₹1,234,000`.
    pub fn display(&self, symbol: &str) -> String {
        let (sign, num) = if self.is_negative() {
            ("-", self.value.abs())
        } else {
            ("", self.value)
        };
        let whole = num.round().to_f64().unwrap_or_default();
        format!("{sign}{symbol}{}", format_num::format_num!(",.0f", whole))
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // The sign may come before or after the currency symbol: "-$50" or "$-50".
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let rest = rest
            .trim_start_matches(|c| CURRENCY_SYMBOLS.contains(&c))
            .trim_start();
        let digits = rest.replace(',', "");
        let digits = if negative {
            format!("-{digits}")
        } else {
            digits
        };

        let value = Decimal::from_str(&digits).map_err(AmountError)?;
        Ok(Amount { value })
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.value, f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Agents sometimes send a bare JSON number.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(serde_json::Number),
        }
        let s = match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s,
            Repr::Number(n) => n.to_string(),
        };
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_currency_symbols() {
        for s in ["$1,000.00", "₹1,000.00", "€1,000.00", "£1,000.00"] {
            let amount = Amount::from_str(s).unwrap();
            assert_eq!(amount.value(), dec("1000.00"), "{s}");
        }
    }

    #[test]
    fn test_parse_negative_either_side_of_symbol() {
        assert_eq!(Amount::from_str("-$50").unwrap().value(), dec("-50"));
        assert_eq!(Amount::from_str("$-50").unwrap().value(), dec("-50"));
    }

    #[test]
    fn test_parse_indian_grouping() {
        let amount = Amount::from_str("₹12,34,567").unwrap();
        assert_eq!(amount.value(), dec("1234567"));
    }

    #[test]
    fn test_parse_empty_and_whitespace() {
        assert_eq!(Amount::from_str("").unwrap(), Amount::ZERO);
        assert_eq!(Amount::from_str("  $50.00  ").unwrap().value(), dec("50.00"));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("n/a").is_err());
        assert!(Amount::from_str("12abc").is_err());
    }

    #[test]
    fn test_display_kpi() {
        let amount = Amount::new(dec("1234567.4"));
        assert_eq!(amount.display("₹"), "₹1,234,567");
        let negative = Amount::new(dec("-2500"));
        assert_eq!(negative.display("$"), "-$2,500");
        assert_eq!(Amount::ZERO.display("₹"), "₹0");
    }

    #[test]
    fn test_serde() {
        let amount = Amount::new(dec("50.25"));
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"50.25\"");
        let back: Amount = serde_json::from_str("\"₹50.25\"").unwrap();
        assert_eq!(back, amount);
        let number: Amount = serde_json::from_str("1500").unwrap();
        assert_eq!(number, Amount::new(dec("1500")));
        assert!(serde_json::from_str::<Amount>("true").is_err());
    }
}
