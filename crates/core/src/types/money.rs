//! Monetary amounts with decimal arithmetic and INR display formatting.
//!
//! Amounts are stored in the storage currency (USD) and only converted at
//! display time, using a fixed USD→INR conversion rate. Display output
//! follows the en-IN digit grouping convention: the last three integer
//! digits form one group, every group before that has two digits
//! (`₹1,18,000.00`).

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Fixed USD→INR conversion rate applied at display time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsdToInrRate(Decimal);

impl UsdToInrRate {
    /// Create a conversion rate.
    #[must_use]
    pub const fn new(rate: Decimal) -> Self {
        Self(rate)
    }

    /// Get the underlying decimal rate.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl Default for UsdToInrRate {
    fn default() -> Self {
        // Fixed display rate: 1 USD = 83.25 INR.
        Self(Decimal::new(8325, 2))
    }
}

/// A monetary amount in the storage currency (USD).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Create a money amount from a decimal value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Convert to INR at the given rate and format for display.
    ///
    /// Rounds to two fraction digits (half away from zero) and applies the
    /// en-IN grouping convention.
    #[must_use]
    pub fn display_inr(&self, rate: UsdToInrRate) -> String {
        let inr = (self.0 * rate.as_decimal())
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format_inr(inr)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Format an INR decimal amount as `₹x,xx,xxx.yy`.
fn format_inr(amount: Decimal) -> String {
    let negative = amount.is_sign_negative();
    let abs = amount.abs();
    let fixed = format!("{abs:.2}");
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i.to_owned(), f.to_owned()),
        None => (fixed, "00".to_owned()),
    };

    let grouped = group_indian(&int_part);
    if negative {
        format!("-₹{grouped}.{frac_part}")
    } else {
        format!("₹{grouped}.{frac_part}")
    }
}

/// Apply en-IN digit grouping: last three digits together, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }

    let split = digits.len() - 3;
    let (head, tail) = digits.split_at(split);

    // Group the head into pairs from the right.
    let head_chars: Vec<char> = head.chars().collect();
    let mut groups: Vec<String> = Vec::new();
    let mut end = head_chars.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(head_chars.get(start..end).unwrap_or_default().iter().collect());
        end = start;
    }
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::new(s.parse().unwrap())
    }

    #[test]
    fn test_group_indian_short() {
        assert_eq!(group_indian("0"), "0");
        assert_eq!(group_indian("999"), "999");
    }

    #[test]
    fn test_group_indian_thousands() {
        assert_eq!(group_indian("1000"), "1,000");
        assert_eq!(group_indian("99999"), "99,999");
    }

    #[test]
    fn test_group_indian_lakhs_and_crores() {
        assert_eq!(group_indian("118000"), "1,18,000");
        assert_eq!(group_indian("12345678"), "1,23,45,678");
    }

    #[test]
    fn test_display_inr_default_rate() {
        // 100 USD * 83.25 = 8,325.00 INR
        assert_eq!(
            money("100").display_inr(UsdToInrRate::default()),
            "₹8,325.00"
        );
    }

    #[test]
    fn test_display_inr_grouping() {
        // 1,000 USD * 83.25 = 83,250.00 INR
        assert_eq!(
            money("1000").display_inr(UsdToInrRate::default()),
            "₹83,250.00"
        );
        // 10,000 USD * 83.25 = 8,32,500.00 INR (en-IN grouping)
        assert_eq!(
            money("10000").display_inr(UsdToInrRate::default()),
            "₹8,32,500.00"
        );
    }

    #[test]
    fn test_display_inr_rounding() {
        // 0.01 USD * 83.25 = 0.8325 -> 0.83
        assert_eq!(
            money("0.01").display_inr(UsdToInrRate::default()),
            "₹0.83"
        );
    }

    #[test]
    fn test_display_inr_negative() {
        assert_eq!(
            money("-1").display_inr(UsdToInrRate::default()),
            "-₹83.25"
        );
    }

    #[test]
    fn test_amount_round_trip() {
        let m = money("49.99");
        assert_eq!(m.amount(), "49.99".parse().unwrap());
        assert_eq!(m.to_string(), "49.99");
    }
}
