//! Integration tests for the static catalog that serves browse traffic
//! when the database is unavailable.

#![allow(clippy::unwrap_used)]

use marigold_core::ProductId;
use marigold_storefront::models::{ProductFilters, SortBy, SortOrder};
use marigold_storefront::services::StaticCatalog;
use rust_decimal::Decimal;

#[test]
fn fallback_listing_honors_filters_and_paging() {
    let catalog = StaticCatalog::new();

    let first = catalog.find_all(&ProductFilters {
        limit: 3,
        offset: 0,
        ..ProductFilters::default()
    });
    let second = catalog.find_all(&ProductFilters {
        limit: 3,
        offset: 3,
        ..ProductFilters::default()
    });

    assert_eq!(first.total, second.total);
    assert_eq!(first.items.len(), 3);
    assert_eq!(first.page, 1);
    assert_eq!(second.page, 2);
    // Pages never overlap.
    for item in &second.items {
        assert!(first.items.iter().all(|p| p.id != item.id));
    }
}

#[test]
fn fallback_products_are_always_purchasable_shapes() {
    // The fallback exists to keep browse pages rendering; every product
    // must carry the fields the product card needs.
    let catalog = StaticCatalog::new();
    let page = catalog.find_all(&ProductFilters::latest(50));

    assert!(page.total > 0);
    for product in &page.items {
        assert!(product.is_active);
        assert!(product.price > Decimal::ZERO);
        assert!(product.primary_image.is_some());
        assert!(product.category_name.is_some());
    }
}

#[test]
fn fallback_search_is_case_insensitive() {
    let catalog = StaticCatalog::new();
    let filters = ProductFilters {
        search: Some("MERINO".to_owned()),
        ..ProductFilters::latest(20)
    };
    let page = catalog.find_all(&filters);
    assert_eq!(page.total, 1);
}

#[test]
fn fallback_sorting_matches_live_semantics() {
    let catalog = StaticCatalog::new();

    let by_price = catalog.find_all(&ProductFilters {
        sort_by: SortBy::Price,
        sort_order: SortOrder::Desc,
        ..ProductFilters::latest(50)
    });
    let prices: Vec<_> = by_price.items.iter().map(|p| p.price).collect();
    let mut sorted = prices.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(prices, sorted);

    let by_rating = catalog.find_all(&ProductFilters {
        sort_by: SortBy::Rating,
        sort_order: SortOrder::Desc,
        ..ProductFilters::latest(50)
    });
    let ratings: Vec<_> = by_rating.items.iter().map(|p| p.avg_rating).collect();
    let mut sorted = ratings.clone();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
    assert_eq!(ratings, sorted);
}

#[test]
fn related_fills_the_shelf_across_categories() {
    let catalog = StaticCatalog::new();
    let related = catalog.related(ProductId::new(1), 4);

    // A full shelf even though the product's own category is small.
    assert_eq!(related.len(), 4);
    assert!(related.iter().all(|p| p.id != ProductId::new(1)));
}

#[test]
fn fallback_categories_cover_every_product() {
    let catalog = StaticCatalog::new();
    let categories = catalog.categories();
    let page = catalog.find_all(&ProductFilters::latest(50));

    for product in &page.items {
        let name = product.category_name.as_deref().unwrap();
        assert!(categories.iter().any(|c| c.name == name));
    }
}
