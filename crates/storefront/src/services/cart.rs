//! Cart store: serialized-Vec persistence over a pluggable key-value
//! backend, with change notifications over a broadcast channel.
//!
//! Every mutation is read-modify-write on the serialized cart under one
//! store key; the backend holds opaque JSON strings and knows nothing
//! about cart structure. A corrupt or missing value reads as an empty
//! cart, never an error.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, warn};

use marigold_core::ProductId;

use crate::models::{Cart, CartLineItem};

/// Capacity of the change-notification channel. Slow subscribers lag and
/// drop old events rather than blocking mutations.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// String key-value persistence for serialized carts.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, if any.
    fn get(&self, key: &str) -> impl Future<Output = Option<String>> + Send;
    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> impl Future<Output = ()> + Send;
    /// Remove the value under `key`.
    fn remove(&self, key: &str) -> impl Future<Output = ()> + Send;
}

/// In-process [`KeyValueStore`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: String) {
        self.entries.write().await.insert(key.to_owned(), value);
    }

    async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

/// Emitted after every successful cart mutation.
#[derive(Debug, Clone)]
pub struct CartEvent {
    /// The store key of the cart that changed.
    pub cart_key: String,
    /// Item count after the mutation.
    pub count: u32,
}

/// Input for adding a line to a cart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub selected_color: Option<String>,
    #[serde(default)]
    pub selected_size: Option<String>,
}

const fn default_quantity() -> u32 {
    1
}

impl AddToCart {
    /// A line is addable when it has a positive product id, a non-blank
    /// name, and a positive price.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.id.as_i32() > 0 && !self.name.trim().is_empty() && self.price > Decimal::ZERO
    }
}

/// Cart operations over a [`KeyValueStore`] backend.
#[derive(Clone)]
pub struct CartStore<S> {
    store: Arc<S>,
    events: broadcast::Sender<CartEvent>,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Create a cart store over the given backend.
    #[must_use]
    pub fn new(store: S) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store: Arc::new(store),
            events,
        }
    }

    /// Subscribe to cart change events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Read the cart under `key`. Missing or unparseable data reads as
    /// an empty cart.
    pub async fn cart(&self, key: &str) -> Cart {
        let Some(raw) = self.store.get(key).await else {
            return Cart::empty();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(cart_key = key, error = %e, "discarding unparseable cart data");
            Cart::empty()
        })
    }

    /// Add a line to the cart.
    ///
    /// An identical variant (same product, color, and size) merges into
    /// the existing line by summing quantities; otherwise a new line is
    /// appended. An invalid input is dropped with a warning and the cart
    /// is returned unchanged.
    pub async fn add(&self, key: &str, input: AddToCart) -> Cart {
        if !input.is_valid() {
            warn!(cart_key = key, product_id = %input.id, "rejecting invalid cart line");
            return self.cart(key).await;
        }

        let mut cart = self.cart(key).await;
        let quantity = input.quantity.max(1);

        if let Some(line) = cart.find_mut(
            input.id,
            input.selected_color.as_deref(),
            input.selected_size.as_deref(),
        ) {
            line.quantity += quantity;
        } else {
            cart.items.push(CartLineItem {
                id: input.id,
                name: input.name,
                price: input.price,
                image: input.image,
                quantity,
                selected_color: input.selected_color,
                selected_size: input.selected_size,
            });
        }

        self.persist(key, cart).await
    }

    /// Set the quantity of the line with the given composite identity.
    ///
    /// A quantity of exactly zero removes the line; a negative quantity
    /// is rejected and the cart returned unchanged. An unknown identity
    /// also leaves the cart unchanged.
    pub async fn update_quantity(
        &self,
        key: &str,
        id: ProductId,
        color: Option<&str>,
        size: Option<&str>,
        quantity: i64,
    ) -> Cart {
        if quantity < 0 {
            warn!(cart_key = key, product_id = %id, quantity, "rejecting negative quantity");
            return self.cart(key).await;
        }
        if quantity == 0 {
            return self.remove(key, id, color, size).await;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        let mut cart = self.cart(key).await;
        let Some(line) = cart.find_mut(id, color, size) else {
            debug!(cart_key = key, product_id = %id, "quantity update for absent line");
            return cart;
        };
        line.quantity = quantity;

        self.persist(key, cart).await
    }

    /// Remove the line with the given composite identity, if present.
    ///
    /// Persists and notifies even when nothing matched, so subscribers
    /// see one event per mutation call.
    pub async fn remove(
        &self,
        key: &str,
        id: ProductId,
        color: Option<&str>,
        size: Option<&str>,
    ) -> Cart {
        let mut cart = self.cart(key).await;
        cart.items.retain(|item| !item.matches(id, color, size));
        self.persist(key, cart).await
    }

    /// Remove every line and the stored value itself.
    pub async fn clear(&self, key: &str) -> Cart {
        self.store.remove(key).await;
        self.notify(key, 0);
        Cart::empty()
    }

    async fn persist(&self, key: &str, cart: Cart) -> Cart {
        match serde_json::to_string(&cart) {
            Ok(raw) => self.store.set(key, raw).await,
            Err(e) => {
                // Vec<CartLineItem> serialization cannot fail in practice.
                warn!(cart_key = key, error = %e, "failed to serialize cart");
            }
        }
        self.notify(key, cart.count());
        cart
    }

    fn notify(&self, key: &str, count: u32) {
        // A send error only means nobody is listening right now.
        let _ = self.events.send(CartEvent {
            cart_key: key.to_owned(),
            count,
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store() -> CartStore<InMemoryStore> {
        CartStore::new(InMemoryStore::new())
    }

    fn add_input(id: i32, name: &str, price: &str, quantity: u32) -> AddToCart {
        AddToCart {
            id: ProductId::new(id),
            name: name.to_owned(),
            price: price.parse().unwrap(),
            image: None,
            quantity,
            selected_color: None,
            selected_size: None,
        }
    }

    #[tokio::test]
    async fn test_missing_cart_reads_empty() {
        let cart = store().cart("cart:anon").await;
        assert!(cart.items.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_cart_reads_empty() {
        let store = store();
        store.store.set("cart:anon", "{not json".to_owned()).await;
        let cart = store.cart("cart:anon").await;
        assert!(cart.items.is_empty());
    }

    #[tokio::test]
    async fn test_add_merges_identical_variant() {
        let store = store();
        store.add("c", add_input(1, "Shirt", "49.99", 1)).await;
        let cart = store.add("c", add_input(1, "Shirt", "49.99", 2)).await;
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_add_distinct_variant_appends() {
        let store = store();
        let mut red = add_input(1, "Shirt", "49.99", 1);
        red.selected_color = Some("Red".to_owned());
        let mut blue = add_input(1, "Shirt", "49.99", 1);
        blue.selected_color = Some("Blue".to_owned());

        store.add("c", red).await;
        let cart = store.add("c", blue).await;
        assert_eq!(cart.items.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_line_is_dropped() {
        let store = store();
        let cart = store.add("c", add_input(0, "Ghost", "10", 1)).await;
        assert!(cart.items.is_empty());
        let cart = store.add("c", add_input(1, "   ", "10", 1)).await;
        assert!(cart.items.is_empty());
        let cart = store.add("c", add_input(1, "Free", "0", 1)).await;
        assert!(cart.items.is_empty());
    }

    #[tokio::test]
    async fn test_zero_quantity_add_coerces_to_one() {
        let store = store();
        let cart = store.add("c", add_input(1, "Shirt", "10", 0)).await;
        assert_eq!(cart.items[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_update_quantity_zero_removes() {
        let store = store();
        store.add("c", add_input(1, "Shirt", "10", 2)).await;
        let cart = store
            .update_quantity("c", ProductId::new(1), None, None, 0)
            .await;
        assert!(cart.items.is_empty());
    }

    #[tokio::test]
    async fn test_negative_quantity_leaves_cart_unchanged() {
        let store = store();
        store.add("c", add_input(1, "Shirt", "10", 2)).await;
        let cart = store
            .update_quantity("c", ProductId::new(1), None, None, -3)
            .await;
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_update_quantity_sets_value() {
        let store = store();
        store.add("c", add_input(1, "Shirt", "10", 2)).await;
        let cart = store
            .update_quantity("c", ProductId::new(1), None, None, 7)
            .await;
        assert_eq!(cart.items[0].quantity, 7);
    }

    #[tokio::test]
    async fn test_remove_only_matching_variant() {
        let store = store();
        let mut m = add_input(1, "Shirt", "10", 1);
        m.selected_size = Some("M".to_owned());
        let mut l = add_input(1, "Shirt", "10", 1);
        l.selected_size = Some("L".to_owned());
        store.add("c", m).await;
        store.add("c", l).await;

        let cart = store.remove("c", ProductId::new(1), None, Some("M")).await;
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].selected_size.as_deref(), Some("L"));
    }

    #[tokio::test]
    async fn test_remove_of_absent_line_still_notifies() {
        let store = store();
        store.add("c", add_input(1, "Shirt", "10", 1)).await;
        let mut rx = store.subscribe();

        let cart = store.remove("c", ProductId::new(99), None, None).await;
        assert_eq!(cart.items.len(), 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.count, 1);
    }

    #[tokio::test]
    async fn test_clear_empties_store() {
        let store = store();
        store.add("c", add_input(1, "Shirt", "10", 1)).await;
        store.clear("c").await;
        assert!(store.store.get("c").await.is_none());
        assert!(store.cart("c").await.items.is_empty());
    }

    #[tokio::test]
    async fn test_carts_are_isolated_by_key() {
        let store = store();
        store.add("cart:a", add_input(1, "Shirt", "10", 1)).await;
        assert!(store.cart("cart:b").await.items.is_empty());
        assert_eq!(store.cart("cart:a").await.count(), 1);
    }

    #[tokio::test]
    async fn test_mutations_broadcast_events() {
        let store = store();
        let mut rx = store.subscribe();
        store.add("c", add_input(1, "Shirt", "10", 2)).await;
        let event = rx.recv().await.unwrap();
        assert_eq!(event.cart_key, "c");
        assert_eq!(event.count, 2);
    }
}
