//! Integration tests for cart store consistency.
//!
//! These cover the rules the storefront UI relies on: variant identity,
//! merge-on-add, quantity semantics, and per-key isolation.

#![allow(clippy::unwrap_used)]

use marigold_core::ProductId;
use marigold_storefront::services::{AddToCart, CartStore, InMemoryStore, KeyValueStore};
use rust_decimal::Decimal;

fn store() -> CartStore<InMemoryStore> {
    CartStore::new(InMemoryStore::new())
}

fn line(id: i32, quantity: u32, color: Option<&str>, size: Option<&str>) -> AddToCart {
    AddToCart {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        price: Decimal::new(4999, 2),
        image: None,
        quantity,
        selected_color: color.map(String::from),
        selected_size: size.map(String::from),
    }
}

#[tokio::test]
async fn same_variant_merges_into_one_line() {
    let carts = store();
    carts.add("visitor-1", line(1, 1, Some("Black"), Some("M"))).await;
    let cart = carts.add("visitor-1", line(1, 2, Some("Black"), Some("M"))).await;

    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(cart.count(), 3);
}

#[tokio::test]
async fn different_size_is_a_separate_line() {
    let carts = store();
    carts.add("visitor-1", line(1, 1, Some("Black"), Some("M"))).await;
    let cart = carts.add("visitor-1", line(1, 1, Some("Black"), Some("L"))).await;

    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.count(), 2);
}

#[tokio::test]
async fn total_is_sum_of_line_totals() {
    let carts = store();
    let mut cheap = line(1, 2, None, None);
    cheap.price = Decimal::new(1000, 2); // 10.00
    let mut dear = line(2, 1, None, None);
    dear.price = Decimal::new(9950, 2); // 99.50

    carts.add("visitor-1", cheap).await;
    let cart = carts.add("visitor-1", dear).await;

    assert_eq!(cart.total(), Decimal::new(11950, 2));
}

#[tokio::test]
async fn update_to_zero_removes_the_line() {
    let carts = store();
    carts.add("visitor-1", line(1, 2, None, None)).await;

    let cart = carts
        .update_quantity("visitor-1", ProductId::new(1), None, None, 0)
        .await;
    assert!(cart.items.is_empty());
}

#[tokio::test]
async fn negative_quantity_is_rejected() {
    let carts = store();
    carts.add("visitor-1", line(1, 2, None, None)).await;

    let cart = carts
        .update_quantity("visitor-1", ProductId::new(1), None, None, -3)
        .await;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);

    // The stored cart is untouched too.
    assert_eq!(carts.cart("visitor-1").await.count(), 2);
}

#[tokio::test]
async fn removal_targets_the_exact_variant() {
    let carts = store();
    carts.add("visitor-1", line(1, 1, Some("Red"), None)).await;
    carts.add("visitor-1", line(1, 1, Some("Blue"), None)).await;

    let cart = carts
        .remove("visitor-1", ProductId::new(1), Some("Red"), None)
        .await;

    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].selected_color.as_deref(), Some("Blue"));
}

#[tokio::test]
async fn keys_are_fully_isolated() {
    let carts = store();
    carts.add("visitor-1", line(1, 1, None, None)).await;
    carts.add("visitor-2", line(2, 5, None, None)).await;

    assert_eq!(carts.cart("visitor-1").await.count(), 1);
    assert_eq!(carts.cart("visitor-2").await.count(), 5);

    carts.clear("visitor-1").await;
    assert_eq!(carts.cart("visitor-1").await.count(), 0);
    assert_eq!(carts.cart("visitor-2").await.count(), 5);
}

#[tokio::test]
async fn corrupt_stored_data_degrades_to_empty() {
    // Simulate a corrupted backend value.
    let backend = InMemoryStore::new();
    backend.set("visitor-1", "][ not a cart".to_owned()).await;
    let carts = CartStore::new(backend);

    let cart = carts.cart("visitor-1").await;
    assert!(cart.items.is_empty());

    // The cart remains usable after the reset.
    let cart = carts.add("visitor-1", line(2, 1, None, None)).await;
    assert_eq!(cart.items.len(), 1);
}

#[tokio::test]
async fn invalid_lines_never_enter_the_cart() {
    let carts = store();

    let mut free = line(1, 1, None, None);
    free.price = Decimal::ZERO;
    let mut unnamed = line(2, 1, None, None);
    unnamed.name = String::new();

    carts.add("visitor-1", free).await;
    let cart = carts.add("visitor-1", unnamed).await;

    assert!(cart.items.is_empty());
}

#[tokio::test]
async fn events_follow_every_mutation() {
    let carts = store();
    let mut rx = carts.subscribe();

    carts.add("visitor-1", line(1, 2, None, None)).await;
    carts
        .update_quantity("visitor-1", ProductId::new(1), None, None, 5)
        .await;
    carts.clear("visitor-1").await;

    assert_eq!(rx.recv().await.unwrap().count, 2);
    assert_eq!(rx.recv().await.unwrap().count, 5);
    assert_eq!(rx.recv().await.unwrap().count, 0);
}
