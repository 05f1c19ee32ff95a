//! Product route handlers.
//!
//! Reads go through [`CatalogService`](crate::services::CatalogService),
//! so a database outage degrades to the static catalog instead of
//! erroring. Writes go straight to the repository and invalidate the
//! product cache.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use marigold_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::{Page, Product, ProductFilters, ProductUpdate, SortBy, SortOrder};
use crate::state::AppState;

/// Maximum rows a single listing request may ask for.
const MAX_LIMIT: i64 = 100;
/// Default number of related products.
const DEFAULT_RELATED: i64 = 4;

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub bestseller: Option<bool>,
    pub is_new: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListQuery {
    /// Resolve the raw query into repository filters. Out-of-range paging
    /// values clamp instead of erroring; unknown sort keys fall back to
    /// newest-first.
    fn into_filters(self) -> ProductFilters {
        let limit = self
            .limit
            .unwrap_or(ProductFilters::DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT);
        let page = self.page.unwrap_or(1).max(1);

        ProductFilters {
            category: self.category,
            brand: self.brand,
            price_min: self.min_price,
            price_max: self.max_price,
            search: self.search,
            featured: self.featured,
            bestseller: self.bestseller,
            is_new: self.is_new,
            sort_by: SortBy::resolve(self.sort_by.as_deref()),
            sort_order: SortOrder::resolve(self.sort_order.as_deref()),
            limit,
            offset: (page - 1) * limit,
        }
    }
}

/// Query parameter for shelf-style listings (featured, bestsellers, new).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ShelfQuery {
    pub limit: Option<i64>,
}

impl ShelfQuery {
    fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(ProductFilters::DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT)
    }
}

/// `GET /api/products`
#[instrument(skip(state, query))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Page<Product>> {
    let filters = query.into_filters();
    Json(state.catalog().products(&filters).await)
}

/// `GET /api/products/featured`
pub async fn featured(
    State(state): State<AppState>,
    Query(query): Query<ShelfQuery>,
) -> Json<Page<Product>> {
    Json(state.catalog().featured(query.limit()).await)
}

/// `GET /api/products/bestsellers`
pub async fn bestsellers(
    State(state): State<AppState>,
    Query(query): Query<ShelfQuery>,
) -> Json<Page<Product>> {
    Json(state.catalog().bestsellers(query.limit()).await)
}

/// `GET /api/products/new-arrivals`
pub async fn new_arrivals(
    State(state): State<AppState>,
    Query(query): Query<ShelfQuery>,
) -> Json<Page<Product>> {
    Json(state.catalog().new_arrivals(query.limit()).await)
}

/// `GET /api/products/{id}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    state
        .catalog()
        .product(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))
}

/// `GET /api/products/{id}/related`
#[instrument(skip(state))]
pub async fn related(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Query(query): Query<ShelfQuery>,
) -> Json<Vec<Product>> {
    let limit = query.limit.unwrap_or(DEFAULT_RELATED).clamp(1, MAX_LIMIT);
    Json(state.catalog().related(id, limit).await)
}

/// `PUT /api/products/{id}`
#[instrument(skip(state, update))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool()).update(id, &update).await?;
    state.catalog().invalidate_product(id).await;
    Ok(Json(product))
}

/// `DELETE /api/products/{id}`
///
/// Products are deactivated rather than deleted, so existing orders keep
/// a valid reference.
#[instrument(skip(state))]
pub async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    ProductRepository::new(state.pool()).deactivate(id).await?;
    state.catalog().invalidate_product(id).await;
    Ok(Json(serde_json::json!({ "deactivated": id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging_converts_to_offset() {
        let query = ListQuery {
            page: Some(3),
            limit: Some(10),
            ..ListQuery::default()
        };
        let filters = query.into_filters();
        assert_eq!(filters.limit, 10);
        assert_eq!(filters.offset, 20);
    }

    #[test]
    fn test_paging_clamps_bad_values() {
        let query = ListQuery {
            page: Some(-5),
            limit: Some(10_000),
            ..ListQuery::default()
        };
        let filters = query.into_filters();
        assert_eq!(filters.limit, MAX_LIMIT);
        assert_eq!(filters.offset, 0);
    }

    #[test]
    fn test_unknown_sort_falls_back() {
        let query = ListQuery {
            sort_by: Some("popularity".to_owned()),
            sort_order: Some("sideways".to_owned()),
            ..ListQuery::default()
        };
        let filters = query.into_filters();
        assert_eq!(filters.sort_by, SortBy::CreatedAt);
        assert_eq!(filters.sort_order, SortOrder::Desc);
    }
}
