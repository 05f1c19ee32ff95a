//! Order model, creation inputs, and the typed update allow-list.
//!
//! Order items and addresses are snapshots frozen at order time. Later
//! changes to a product or to a user's saved address never alter an
//! order that has already been placed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marigold_core::{
    OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId, UserId, VariantId,
};

/// An order with its items and address snapshots.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: Option<UserId>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
    pub shipping_address: Option<OrderAddress>,
    pub billing_address: Option<OrderAddress>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Whether cancellation is still allowed.
    #[must_use]
    pub const fn can_be_cancelled(&self) -> bool {
        self.status.can_be_cancelled()
    }
}

/// A frozen line-item snapshot on an order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// A denormalized address snapshot attached to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAddress {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street_address_1: String,
    pub street_address_2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// Input for the order-creation transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: Option<UserId>,
    pub items: Vec<NewOrderItem>,
    pub shipping_address: Option<NewOrderAddress>,
    pub billing_address: Option<NewOrderAddress>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub subtotal: Decimal,
    #[serde(default)]
    pub tax_amount: Decimal,
    #[serde(default)]
    pub shipping_amount: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
}

impl NewOrder {
    /// `subtotal + tax + shipping − discount`.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.subtotal + self.tax_amount + self.shipping_amount - self.discount_amount
    }
}

/// One line item of a new order; price fields are captured from the cart
/// snapshot, not re-read from the live product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub product_name: String,
    pub product_sku: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Address input for a new order. Identical shape to [`OrderAddress`];
/// a separate type keeps the write model free to diverge.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderAddress {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street_address_1: String,
    #[serde(default)]
    pub street_address_2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// The mutable order fields. Everything else is frozen at creation.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl OrderUpdate {
    /// Whether any field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.payment_status.is_none()
            && self.payment_method.is_none()
            && self.notes.is_none()
            && self.shipped_at.is_none()
            && self.delivered_at.is_none()
    }
}

/// Filters for order listings.
#[derive(Debug, Clone, Default)]
pub struct OrderFilters {
    pub user_id: Option<UserId>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn new_order(subtotal: &str, tax: &str, shipping: &str, discount: &str) -> NewOrder {
        NewOrder {
            user_id: None,
            items: vec![],
            shipping_address: None,
            billing_address: None,
            payment_method: None,
            notes: None,
            subtotal: dec(subtotal),
            tax_amount: dec(tax),
            shipping_amount: dec(shipping),
            discount_amount: dec(discount),
        }
    }

    #[test]
    fn test_total_amount() {
        // subtotal 1000, 18% tax, free shipping over the threshold
        assert_eq!(
            new_order("1000", "180", "0", "0").total_amount(),
            dec("1180")
        );
    }

    #[test]
    fn test_total_amount_with_discount_and_shipping() {
        assert_eq!(
            new_order("50", "9", "10", "5").total_amount(),
            dec("64")
        );
    }

    #[test]
    fn test_total_amount_all_zero() {
        assert_eq!(new_order("0", "0", "0", "0").total_amount(), dec("0"));
    }

    #[test]
    fn test_cancellability_follows_status() {
        let mut order = Order {
            id: OrderId::new(1),
            order_number: "MG00000000000".to_owned(),
            user_id: None,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            subtotal: dec("10"),
            tax_amount: dec("1.80"),
            shipping_amount: dec("10"),
            discount_amount: dec("0"),
            total_amount: dec("21.80"),
            payment_method: None,
            notes: None,
            items: vec![],
            shipping_address: None,
            billing_address: None,
            shipped_at: None,
            delivered_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(order.can_be_cancelled());
        order.status = OrderStatus::Delivered;
        assert!(!order.can_be_cancelled());
    }
}
