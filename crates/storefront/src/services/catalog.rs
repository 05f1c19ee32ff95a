//! Catalog reads with a database primary and the static catalog as a
//! fallback, plus a short-TTL product cache.
//!
//! Read failures degrade rather than error: a broken database answer is
//! logged and the static catalog serves in its place, so browse pages
//! stay up during an outage. Fallback data is clearly stale; writes are
//! never degraded this way.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use marigold_core::{CategoryId, ProductId};

use crate::db::{CategoryRepository, ProductRepository, RepositoryError};
use crate::models::{Category, Page, Product, ProductFilters};
use crate::services::static_catalog::StaticCatalog;

/// Cached products live this long; staleness of this order is fine for
/// catalog display data.
const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(300);
const PRODUCT_CACHE_CAPACITY: u64 = 1_000;

/// Catalog query service shared across request handlers.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    pool: PgPool,
    fallback: StaticCatalog,
    product_cache: Cache<ProductId, Product>,
}

impl CatalogService {
    /// Create a catalog service over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let product_cache = Cache::builder()
            .max_capacity(PRODUCT_CACHE_CAPACITY)
            .time_to_live(PRODUCT_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner {
                pool,
                fallback: StaticCatalog::new(),
                product_cache,
            }),
        }
    }

    /// List products. Falls back to the static catalog when the
    /// database read fails.
    #[instrument(skip(self, filters))]
    pub async fn products(&self, filters: &ProductFilters) -> Page<Product> {
        match ProductRepository::new(&self.inner.pool).find_all(filters).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "product listing failed, serving static catalog");
                self.inner.fallback.find_all(filters)
            }
        }
    }

    /// Fetch one product, through the cache.
    ///
    /// A database error falls back to the static catalog; a clean
    /// "not found" does not, so missing products still 404.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Option<Product> {
        if let Some(product) = self.inner.product_cache.get(&id).await {
            debug!("cache hit for product");
            return Some(product);
        }

        match ProductRepository::new(&self.inner.pool).find_by_id(id).await {
            Ok(Some(product)) => {
                self.inner.product_cache.insert(id, product.clone()).await;
                Some(product)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "product lookup failed, serving static catalog");
                self.inner.fallback.find_by_id(id)
            }
        }
    }

    /// Products related to the given one.
    ///
    /// The live path recommends within the same category only; the
    /// static fallback additionally backfills across categories, since
    /// its catalog is small enough to exhaust a category.
    #[instrument(skip(self))]
    pub async fn related(&self, id: ProductId, limit: i64) -> Vec<Product> {
        match ProductRepository::new(&self.inner.pool).related(id, limit).await {
            Ok(products) => products,
            Err(e) => {
                warn!(error = %e, "related lookup failed, serving static catalog");
                self.inner
                    .fallback
                    .related(id, usize::try_from(limit).unwrap_or(0))
            }
        }
    }

    /// Featured products, newest first.
    pub async fn featured(&self, limit: i64) -> Page<Product> {
        let filters = ProductFilters {
            featured: Some(true),
            ..ProductFilters::latest(limit)
        };
        self.products(&filters).await
    }

    /// Bestselling products, newest first.
    pub async fn bestsellers(&self, limit: i64) -> Page<Product> {
        let filters = ProductFilters {
            bestseller: Some(true),
            ..ProductFilters::latest(limit)
        };
        self.products(&filters).await
    }

    /// New arrivals, newest first.
    pub async fn new_arrivals(&self, limit: i64) -> Page<Product> {
        let filters = ProductFilters {
            is_new: Some(true),
            ..ProductFilters::latest(limit)
        };
        self.products(&filters).await
    }

    /// List categories, falling back to the static set on failure.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Vec<Category> {
        match CategoryRepository::new(&self.inner.pool).find_all().await {
            Ok(categories) => categories,
            Err(e) => {
                warn!(error = %e, "category listing failed, serving static catalog");
                self.inner.fallback.categories()
            }
        }
    }

    /// Fetch one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn category(
        &self,
        id: CategoryId,
    ) -> Result<Option<Category>, RepositoryError> {
        CategoryRepository::new(&self.inner.pool).find_by_id(id).await
    }

    /// Drop a product from the cache after a write to it.
    pub async fn invalidate_product(&self, id: ProductId) {
        self.inner.product_cache.invalidate(&id).await;
    }
}
