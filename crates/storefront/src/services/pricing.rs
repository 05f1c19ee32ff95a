//! Checkout pricing: tax, shipping, and the order total, computed from
//! the configured rates.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::config::PricingConfig;

/// Stored-currency amounts round to cents, away from zero on ties.
const CENTS: u32 = 2;

/// The price breakdown for a prospective order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingQuote {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
}

/// Quote a cart subtotal against the configured rates.
///
/// Tax is a flat percentage of the subtotal. Shipping is a flat rate,
/// waived when the subtotal exceeds the free-shipping threshold. The
/// total is `subtotal + tax + shipping − discount`.
#[must_use]
pub fn quote(config: &PricingConfig, subtotal: Decimal, discount: Decimal) -> PricingQuote {
    let tax_amount = (subtotal * config.tax_rate)
        .round_dp_with_strategy(CENTS, RoundingStrategy::MidpointAwayFromZero);
    let shipping_amount = if subtotal > config.free_shipping_threshold {
        Decimal::ZERO
    } else {
        config.shipping_flat_rate
    };

    PricingQuote {
        subtotal,
        tax_amount,
        shipping_amount,
        discount_amount: discount,
        total_amount: subtotal + tax_amount + shipping_amount - discount,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn config() -> PricingConfig {
        PricingConfig::default()
    }

    #[test]
    fn test_quote_above_free_shipping_threshold() {
        let quote = quote(&config(), dec("1000"), Decimal::ZERO);
        assert_eq!(quote.tax_amount, dec("180.00"));
        assert_eq!(quote.shipping_amount, Decimal::ZERO);
        assert_eq!(quote.total_amount, dec("1180.00"));
    }

    #[test]
    fn test_quote_below_threshold_pays_shipping() {
        let quote = quote(&config(), dec("50"), Decimal::ZERO);
        assert_eq!(quote.tax_amount, dec("9.00"));
        assert_eq!(quote.shipping_amount, dec("10"));
        assert_eq!(quote.total_amount, dec("69.00"));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // Exactly at the threshold still pays shipping.
        let quote = quote(&config(), dec("100"), Decimal::ZERO);
        assert_eq!(quote.shipping_amount, dec("10"));
    }

    #[test]
    fn test_discount_reduces_total() {
        let quote = quote(&config(), dec("50"), dec("5"));
        assert_eq!(quote.total_amount, dec("64.00"));
    }

    #[test]
    fn test_tax_rounds_to_cents() {
        let quote = quote(&config(), dec("9.99"), Decimal::ZERO);
        // 9.99 * 0.18 = 1.7982
        assert_eq!(quote.tax_amount, dec("1.80"));
    }
}
