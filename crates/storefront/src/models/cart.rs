//! Cart line items and the persisted cart shape.
//!
//! A cart is persisted as a JSON array of line items. Line identity is the
//! composite key (product id, selected color, selected size): the same
//! product appears as separate lines when its variant differs, and adding
//! an identical variant merges into the existing line.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marigold_core::ProductId;

/// One cart line. `price` is a snapshot captured at add time and is not
/// refreshed when the live product changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub selected_color: Option<String>,
    #[serde(default)]
    pub selected_size: Option<String>,
}

impl CartLineItem {
    /// Whether this line has the given composite identity.
    #[must_use]
    pub fn matches(&self, id: ProductId, color: Option<&str>, size: Option<&str>) -> bool {
        self.id == id
            && self.selected_color.as_deref() == color
            && self.selected_size.as_deref() == size
    }

    /// This line's contribution to the cart total.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// An ordered sequence of cart lines. Insertion order is preserved but
/// irrelevant to totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    pub items: Vec<CartLineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of `unit price × quantity` across all lines, in the storage
    /// currency.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Find the line with the given composite identity.
    #[must_use]
    pub fn find_mut(
        &mut self,
        id: ProductId,
        color: Option<&str>,
        size: Option<&str>,
    ) -> Option<&mut CartLineItem> {
        self.items
            .iter_mut()
            .find(|item| item.matches(id, color, size))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i32, price: &str, quantity: u32, color: Option<&str>) -> CartLineItem {
        CartLineItem {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: price.parse().unwrap(),
            image: None,
            quantity,
            selected_color: color.map(String::from),
            selected_size: None,
        }
    }

    #[test]
    fn test_count_and_total() {
        let cart = Cart {
            items: vec![line(1, "100", 2, Some("Black")), line(2, "25.50", 1, None)],
        };
        assert_eq!(cart.count(), 3);
        assert_eq!(cart.total(), "225.50".parse().unwrap());
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = Cart::empty();
        assert_eq!(cart.count(), 0);
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_variant_identity() {
        let item = line(1, "10", 1, Some("Black"));
        assert!(item.matches(ProductId::new(1), Some("Black"), None));
        assert!(!item.matches(ProductId::new(1), Some("Red"), None));
        assert!(!item.matches(ProductId::new(1), Some("Black"), Some("M")));
        assert!(!item.matches(ProductId::new(2), Some("Black"), None));
    }

    #[test]
    fn test_persisted_field_names() {
        let cart = Cart {
            items: vec![line(1, "49.99", 1, Some("Blue"))],
        };
        let json = serde_json::to_value(&cart).unwrap();
        let first = &json[0];
        assert!(first.get("selectedColor").is_some());
        assert!(first.get("selectedSize").is_some());
        assert!(first.get("quantity").is_some());
        // The cart serializes as a bare array of lines.
        assert!(json.is_array());
    }
}
