//! Product repository: filtered catalog pages, single-product reads with
//! attached media, related products, and the typed update path.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use marigold_core::{BrandId, CategoryId, ImageId, ProductId, VariantId};

use super::RepositoryError;
use crate::models::{
    Page, Product, ProductFilters, ProductImage, ProductSpecification, ProductUpdate,
    ProductVariant,
};

/// Joined product row shared by the list and detail queries.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: Option<String>,
    short_description: Option<String>,
    sku: Option<String>,
    price: Decimal,
    compare_price: Option<Decimal>,
    category_id: Option<CategoryId>,
    category_name: Option<String>,
    brand_id: Option<BrandId>,
    brand_name: Option<String>,
    is_active: bool,
    is_featured: bool,
    is_bestseller: bool,
    is_new: bool,
    stock_quantity: i32,
    avg_rating: f64,
    review_count: i64,
    primary_image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Product {
        Product {
            id: self.id,
            name: self.name,
            description: self.description,
            short_description: self.short_description,
            sku: self.sku,
            price: self.price,
            compare_price: self.compare_price,
            category_id: self.category_id,
            category_name: self.category_name,
            brand_id: self.brand_id,
            brand_name: self.brand_name,
            is_active: self.is_active,
            is_featured: self.is_featured,
            is_bestseller: self.is_bestseller,
            is_new: self.is_new,
            in_stock: self.stock_quantity > 0,
            stock_quantity: self.stock_quantity,
            avg_rating: self.avg_rating,
            review_count: self.review_count,
            primary_image: self.primary_image,
            images: Vec::new(),
            variants: Vec::new(),
            specifications: Vec::new(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ImageRow {
    id: ImageId,
    product_id: ProductId,
    image_url: String,
    alt_text: Option<String>,
    is_primary: bool,
    sort_order: i32,
}

#[derive(Debug, FromRow)]
struct VariantRow {
    id: VariantId,
    variant_name: String,
    variant_value: String,
    price_adjustment: Decimal,
    stock_quantity: i32,
}

#[derive(Debug, FromRow)]
struct SpecificationRow {
    spec_name: String,
    spec_value: String,
    spec_group: Option<String>,
    sort_order: i32,
}

/// Shared SELECT head for product queries with review aggregates and the
/// primary image attached.
const PRODUCT_SELECT: &str = r"
SELECT p.id, p.name, p.description, p.short_description, p.sku,
       p.price, p.compare_price,
       p.category_id, c.name AS category_name,
       p.brand_id, b.name AS brand_name,
       p.is_active, p.is_featured, p.is_bestseller, p.is_new,
       p.stock_quantity,
       COALESCE(AVG(r.rating), 0)::float8 AS avg_rating,
       COUNT(DISTINCT r.id) AS review_count,
       pi.image_url AS primary_image,
       p.created_at, p.updated_at
FROM products p
LEFT JOIN categories c ON p.category_id = c.id
LEFT JOIN brands b ON p.brand_id = b.id
LEFT JOIN reviews r ON p.id = r.product_id AND r.is_approved = TRUE
LEFT JOIN product_images pi ON p.id = pi.product_id AND pi.is_primary = TRUE
";

const PRODUCT_GROUP_BY: &str = " GROUP BY p.id, c.name, b.name, pi.image_url";

/// Repository for product reads and writes.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch one page of active products matching the filters.
    ///
    /// The page total comes from a separate COUNT over the same filters,
    /// so `total` reflects all matches (not just this page).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn find_all(
        &self,
        filters: &ProductFilters,
    ) -> Result<Page<Product>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        qb.push(" WHERE p.is_active = TRUE");
        push_filters(&mut qb, filters);
        qb.push(PRODUCT_GROUP_BY);
        qb.push(" ORDER BY ")
            .push(filters.sort_by.sql_expr())
            .push(" ")
            .push(filters.sort_order.sql_keyword());
        qb.push(" LIMIT ").push_bind(filters.limit);
        qb.push(" OFFSET ").push_bind(filters.offset);

        let rows: Vec<ProductRow> = qb.build_query_as().fetch_all(self.pool).await?;

        let mut count_qb = QueryBuilder::<Postgres>::new(
            r"
SELECT COUNT(DISTINCT p.id)
FROM products p
LEFT JOIN categories c ON p.category_id = c.id
LEFT JOIN brands b ON p.brand_id = b.id
",
        );
        count_qb.push(" WHERE p.is_active = TRUE");
        push_filters(&mut count_qb, filters);
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        let mut products: Vec<Product> = rows.into_iter().map(ProductRow::into_product).collect();
        self.attach_images(&mut products).await?;

        let limit = filters.limit.max(1);
        let page = filters.offset / limit + 1;
        Ok(Page::new(products, total, page, filters.limit))
    }

    /// Fetch one active product with images, variants, and specifications.
    ///
    /// Not-found is a normal `None` result, never an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        qb.push(" WHERE p.id = ").push_bind(id);
        qb.push(" AND p.is_active = TRUE");
        qb.push(PRODUCT_GROUP_BY);

        let row: Option<ProductRow> = qb.build_query_as().fetch_optional(self.pool).await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut product = row.into_product();

        let images: Vec<ImageRow> = sqlx::query_as(
            r"
SELECT id, product_id, image_url, alt_text, is_primary, sort_order
FROM product_images
WHERE product_id = $1
ORDER BY sort_order
",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        product.images = images
            .into_iter()
            .map(|img| ProductImage {
                id: img.id,
                url: img.image_url,
                alt_text: img.alt_text,
                is_primary: img.is_primary,
                sort_order: img.sort_order,
            })
            .collect();

        let variants: Vec<VariantRow> = sqlx::query_as(
            r"
SELECT id, variant_name, variant_value, price_adjustment, stock_quantity
FROM product_variants
WHERE product_id = $1 AND is_active = TRUE
ORDER BY variant_name, variant_value
",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        product.variants = variants
            .into_iter()
            .map(|v| ProductVariant {
                id: v.id,
                name: v.variant_name,
                value: v.variant_value,
                price_adjustment: v.price_adjustment,
                stock_quantity: v.stock_quantity,
            })
            .collect();

        let specs: Vec<SpecificationRow> = sqlx::query_as(
            r"
SELECT spec_name, spec_value, spec_group, sort_order
FROM product_specifications
WHERE product_id = $1
ORDER BY sort_order
",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        product.specifications = specs
            .into_iter()
            .map(|s| ProductSpecification {
                name: s.spec_name,
                value: s.spec_value,
                group: s.spec_group,
                sort_order: s.sort_order,
            })
            .collect();

        Ok(Some(product))
    }

    /// Same-category products excluding the product itself, featured
    /// first, then newest. If the category has fewer than `limit` other
    /// products the result is simply shorter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn related(
        &self,
        product_id: ProductId,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r"
SELECT p2.id, p2.name, p2.description, p2.short_description, p2.sku,
       p2.price, p2.compare_price,
       p2.category_id, c.name AS category_name,
       p2.brand_id, b.name AS brand_name,
       p2.is_active, p2.is_featured, p2.is_bestseller, p2.is_new,
       p2.stock_quantity,
       COALESCE(AVG(r.rating), 0)::float8 AS avg_rating,
       COUNT(DISTINCT r.id) AS review_count,
       pi.image_url AS primary_image,
       p2.created_at, p2.updated_at
FROM products p1
JOIN products p2 ON p1.category_id = p2.category_id AND p1.id <> p2.id
LEFT JOIN categories c ON p2.category_id = c.id
LEFT JOIN brands b ON p2.brand_id = b.id
LEFT JOIN reviews r ON p2.id = r.product_id AND r.is_approved = TRUE
LEFT JOIN product_images pi ON p2.id = pi.product_id AND pi.is_primary = TRUE
WHERE p1.id = $1 AND p2.is_active = TRUE
GROUP BY p2.id, c.name, b.name, pi.image_url
ORDER BY p2.is_featured DESC, p2.created_at DESC
LIMIT $2
",
        )
        .bind(product_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductRow::into_product).collect())
    }

    /// Apply a typed update. Only the allow-listed fields in
    /// [`ProductUpdate`] can change.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for an empty update and
    /// `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        if update.is_empty() {
            return Err(RepositoryError::Validation(
                "no valid fields to update".to_owned(),
            ));
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE products SET updated_at = NOW()");
        if let Some(name) = &update.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(description) = &update.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(short_description) = &update.short_description {
            qb.push(", short_description = ").push_bind(short_description);
        }
        if let Some(price) = update.price {
            qb.push(", price = ").push_bind(price);
        }
        if let Some(compare_price) = update.compare_price {
            qb.push(", compare_price = ").push_bind(compare_price);
        }
        if let Some(category_id) = update.category_id {
            qb.push(", category_id = ").push_bind(category_id);
        }
        if let Some(brand_id) = update.brand_id {
            qb.push(", brand_id = ").push_bind(brand_id);
        }
        if let Some(stock_quantity) = update.stock_quantity {
            qb.push(", stock_quantity = ").push_bind(stock_quantity);
        }
        if let Some(is_active) = update.is_active {
            qb.push(", is_active = ").push_bind(is_active);
        }
        if let Some(is_featured) = update.is_featured {
            qb.push(", is_featured = ").push_bind(is_featured);
        }
        if let Some(is_bestseller) = update.is_bestseller {
            qb.push(", is_bestseller = ").push_bind(is_bestseller);
        }
        if let Some(is_new) = update.is_new {
            qb.push(", is_new = ").push_bind(is_new);
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Soft-delete: deactivate the product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn deactivate(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE products SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Fetch images for every product on the page with a single query.
    async fn attach_images(&self, products: &mut [Product]) -> Result<(), RepositoryError> {
        if products.is_empty() {
            return Ok(());
        }

        let ids: Vec<i32> = products.iter().map(|p| p.id.as_i32()).collect();
        let images: Vec<ImageRow> = sqlx::query_as(
            r"
SELECT id, product_id, image_url, alt_text, is_primary, sort_order
FROM product_images
WHERE product_id = ANY($1)
ORDER BY product_id, sort_order
",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        for image in images {
            if let Some(product) = products.iter_mut().find(|p| p.id == image.product_id) {
                product.images.push(ProductImage {
                    id: image.id,
                    url: image.image_url,
                    alt_text: image.alt_text,
                    is_primary: image.is_primary,
                    sort_order: image.sort_order,
                });
            }
        }

        Ok(())
    }
}

/// Append the WHERE fragments for catalog filters. Column names come from
/// enums and constants; only values are bound.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &ProductFilters) {
    if let Some(category) = &filters.category {
        qb.push(" AND c.name = ").push_bind(category.clone());
    }
    if let Some(brand) = &filters.brand {
        qb.push(" AND b.name = ").push_bind(brand.clone());
    }
    if let Some(featured) = filters.featured {
        qb.push(" AND p.is_featured = ").push_bind(featured);
    }
    if let Some(bestseller) = filters.bestseller {
        qb.push(" AND p.is_bestseller = ").push_bind(bestseller);
    }
    if let Some(is_new) = filters.is_new {
        qb.push(" AND p.is_new = ").push_bind(is_new);
    }
    if let Some(price_min) = filters.price_min {
        qb.push(" AND p.price >= ").push_bind(price_min);
    }
    if let Some(price_max) = filters.price_max {
        qb.push(" AND p.price <= ").push_bind(price_max);
    }
    if let Some(search) = &filters.search {
        let pattern = format!("%{search}%");
        qb.push(" AND (p.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.search_keywords ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
