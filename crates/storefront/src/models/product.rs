//! Product model, filters, and the typed update allow-list.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use marigold_core::{BrandId, CategoryId, ImageId, ProductId, VariantId};

/// A catalog product with its joined display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub sku: Option<String>,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub brand_id: Option<BrandId>,
    pub brand_name: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_bestseller: bool,
    pub is_new: bool,
    pub in_stock: bool,
    pub stock_quantity: i32,
    pub avg_rating: f64,
    pub review_count: i64,
    pub primary_image: Option<String>,
    pub images: Vec<ProductImage>,
    pub variants: Vec<ProductVariant>,
    pub specifications: Vec<ProductSpecification>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Discount relative to the compare-at price, as a whole percentage.
    ///
    /// Zero when there is no compare-at price or it does not exceed the
    /// selling price.
    #[must_use]
    pub fn discount_percentage(&self) -> u32 {
        let Some(compare) = self.compare_price else {
            return 0;
        };
        if compare <= self.price || compare.is_zero() {
            return 0;
        }
        let ratio = (compare - self.price) / compare * Decimal::new(100, 0);
        ratio
            .round()
            .try_into()
            .ok()
            .and_then(|v: i64| u32::try_from(v).ok())
            .unwrap_or(0)
    }
}

/// An ordered product image; one per product is marked primary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: ImageId,
    pub url: String,
    pub alt_text: Option<String>,
    pub is_primary: bool,
    pub sort_order: i32,
}

/// A variant axis value (e.g. color "Black", size "M") with its own
/// price adjustment and stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: VariantId,
    pub name: String,
    pub value: String,
    pub price_adjustment: Decimal,
    pub stock_quantity: i32,
}

/// A grouped key/value specification row with explicit sort order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSpecification {
    pub name: String,
    pub value: String,
    pub group: Option<String>,
    pub sort_order: i32,
}

/// Sortable product columns.
///
/// Anything outside this set falls back to [`SortBy::CreatedAt`]; an
/// unknown sort key is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Name,
    Price,
    #[default]
    CreatedAt,
    Rating,
    ReviewCount,
}

impl SortBy {
    /// Resolve a client-supplied sort key, falling back to `createdAt`.
    #[must_use]
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw {
            Some("name") => Self::Name,
            Some("price") => Self::Price,
            Some("rating") => Self::Rating,
            Some("reviewCount" | "review_count") => Self::ReviewCount,
            _ => Self::CreatedAt,
        }
    }

    /// The SQL expression this key sorts by.
    ///
    /// Rating and review count sort on the aggregated review columns.
    #[must_use]
    pub const fn sql_expr(&self) -> &'static str {
        match self {
            Self::Name => "p.name",
            Self::Price => "p.price",
            Self::CreatedAt => "p.created_at",
            Self::Rating => "avg_rating",
            Self::ReviewCount => "review_count",
        }
    }
}

/// Sort direction; defaults to descending, matching the catalog's
/// newest-first listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Resolve a client-supplied direction, falling back to descending.
    #[must_use]
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    /// The SQL keyword for this direction.
    #[must_use]
    pub const fn sql_keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Filter, sort, and paging parameters for catalog queries.
#[derive(Debug, Clone, Default)]
pub struct ProductFilters {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub bestseller: Option<bool>,
    pub is_new: Option<bool>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

impl ProductFilters {
    /// Default page size for catalog listings.
    pub const DEFAULT_LIMIT: i64 = 20;

    /// Filters matching everything, first page, newest first.
    #[must_use]
    pub fn latest(limit: i64) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }
}

/// The mutable product fields. Anything not listed here cannot be
/// changed through the repository.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Option<Decimal>,
    pub compare_price: Option<Decimal>,
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    pub stock_quantity: Option<i32>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_bestseller: Option<bool>,
    pub is_new: Option<bool>,
}

impl ProductUpdate {
    /// Whether any field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.short_description.is_none()
            && self.price.is_none()
            && self.compare_price.is_none()
            && self.category_id.is_none()
            && self.brand_id.is_none()
            && self.stock_quantity.is_none()
            && self.is_active.is_none()
            && self.is_featured.is_none()
            && self.is_bestseller.is_none()
            && self.is_new.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_resolve_known() {
        assert_eq!(SortBy::resolve(Some("name")), SortBy::Name);
        assert_eq!(SortBy::resolve(Some("price")), SortBy::Price);
        assert_eq!(SortBy::resolve(Some("reviewCount")), SortBy::ReviewCount);
    }

    #[test]
    fn test_sort_by_unknown_falls_back() {
        assert_eq!(SortBy::resolve(Some("popularity")), SortBy::CreatedAt);
        assert_eq!(SortBy::resolve(None), SortBy::CreatedAt);
    }

    #[test]
    fn test_sort_order_resolve() {
        assert_eq!(SortOrder::resolve(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::resolve(Some("ASC")), SortOrder::Asc);
        assert_eq!(SortOrder::resolve(Some("sideways")), SortOrder::Desc);
        assert_eq!(SortOrder::resolve(None), SortOrder::Desc);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(ProductUpdate::default().is_empty());
        let update = ProductUpdate {
            price: Some(Decimal::new(999, 2)),
            ..ProductUpdate::default()
        };
        assert!(!update.is_empty());
    }
}
