//! Integration tests for order pricing: tax, shipping, totals, and the
//! display currency conversion.

#![allow(clippy::unwrap_used)]

use marigold_core::{Money, ProductId, UsdToInrRate};
use marigold_storefront::config::PricingConfig;
use marigold_storefront::models::{NewOrder, NewOrderItem};
use marigold_storefront::services::pricing;
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn item(product_id: i32, quantity: i32, unit_price: &str) -> NewOrderItem {
    let unit_price = dec(unit_price);
    NewOrderItem {
        product_id: ProductId::new(product_id),
        variant_id: None,
        product_name: format!("Product {product_id}"),
        product_sku: None,
        quantity,
        unit_price,
        line_total: unit_price * Decimal::from(quantity),
    }
}

#[test]
fn quote_matches_order_total_formula() {
    let config = PricingConfig::default();
    let items = [item(1, 2, "400"), item(2, 1, "200")];
    let subtotal: Decimal = items.iter().map(|i| i.line_total).sum();
    assert_eq!(subtotal, dec("1000"));

    let quote = pricing::quote(&config, subtotal, Decimal::ZERO);
    assert_eq!(quote.tax_amount, dec("180.00"));
    assert_eq!(quote.shipping_amount, Decimal::ZERO);

    let new_order = NewOrder {
        user_id: None,
        items: items.to_vec(),
        shipping_address: None,
        billing_address: None,
        payment_method: None,
        notes: None,
        subtotal: quote.subtotal,
        tax_amount: quote.tax_amount,
        shipping_amount: quote.shipping_amount,
        discount_amount: quote.discount_amount,
    };
    assert_eq!(new_order.total_amount(), dec("1180.00"));
    assert_eq!(new_order.total_amount(), quote.total_amount);
}

#[test]
fn small_orders_pay_flat_shipping() {
    let config = PricingConfig::default();
    let quote = pricing::quote(&config, dec("40"), Decimal::ZERO);
    assert_eq!(quote.tax_amount, dec("7.20"));
    assert_eq!(quote.shipping_amount, dec("10"));
    assert_eq!(quote.total_amount, dec("57.20"));
}

#[test]
fn discount_subtracts_after_tax_and_shipping() {
    let config = PricingConfig::default();
    let quote = pricing::quote(&config, dec("50"), dec("5"));
    // 50 + 9 tax + 10 shipping - 5 discount
    assert_eq!(quote.total_amount, dec("64.00"));
}

#[test]
fn display_total_uses_indian_grouping() {
    let rate = UsdToInrRate::default(); // 83.25
    assert_eq!(Money::new(dec("100")).display_inr(rate), "₹8,325.00");
    // 1180 * 83.25 = 98235
    assert_eq!(Money::new(dec("1180")).display_inr(rate), "₹98,235.00");
    // Past one lakh the grouping switches to pairs: 2000 * 83.25 = 166500
    assert_eq!(Money::new(dec("2000")).display_inr(rate), "₹1,66,500.00");
}
