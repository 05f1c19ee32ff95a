//! Built-in catalog data served when the database is unreachable.
//!
//! A small, fixed product set that keeps browse pages rendering during an
//! outage. It honors the same filters, sorting, and paging as the real
//! repository; writes never touch it.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use marigold_core::{BrandId, CategoryId, ImageId, ProductId, Size, VariantId};

use crate::models::{
    Category, Page, Product, ProductFilters, ProductImage, ProductVariant, SortBy, SortOrder,
};

/// The fallback catalog. Built once at startup and never mutated.
#[derive(Debug)]
pub struct StaticCatalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticCatalog {
    /// Build the seeded catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            products: seed_products(),
            categories: seed_categories(),
        }
    }

    /// List products matching the filters, sorted and paged like the
    /// live catalog.
    #[must_use]
    pub fn find_all(&self, filters: &ProductFilters) -> Page<Product> {
        let mut matched: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| matches_filters(p, filters))
            .collect();
        sort_products(&mut matched, filters.sort_by, filters.sort_order);

        let total = matched.len() as i64;
        let limit = filters.limit.max(1);
        let offset = filters.offset.max(0);
        let page = offset / limit + 1;

        let items = matched
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Page::new(items, total, page, limit)
    }

    /// Fetch a product by id.
    #[must_use]
    pub fn find_by_id(&self, id: ProductId) -> Option<Product> {
        self.products.iter().find(|p| p.id == id).cloned()
    }

    /// Products related to the given one: same category first, then a
    /// cross-category backfill when the category alone cannot fill the
    /// requested count.
    #[must_use]
    pub fn related(&self, id: ProductId, limit: usize) -> Vec<Product> {
        let Some(product) = self.products.iter().find(|p| p.id == id) else {
            return Vec::new();
        };

        let mut related: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| p.id != id && p.category_id == product.category_id)
            .collect();
        related.sort_by(|a, b| {
            b.is_featured
                .cmp(&a.is_featured)
                .then(b.created_at.cmp(&a.created_at))
        });
        related.truncate(limit);

        if related.len() < limit {
            let mut backfill: Vec<&Product> = self
                .products
                .iter()
                .filter(|p| p.id != id && p.category_id != product.category_id)
                .collect();
            backfill.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            related.extend(backfill.into_iter().take(limit - related.len()));
        }

        related.into_iter().cloned().collect()
    }

    /// The seeded category list.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.categories.clone()
    }
}

fn matches_filters(product: &Product, filters: &ProductFilters) -> bool {
    if let Some(category) = &filters.category
        && product
            .category_name
            .as_deref()
            .is_none_or(|name| !name.eq_ignore_ascii_case(category))
    {
        return false;
    }
    if let Some(brand) = &filters.brand
        && product
            .brand_name
            .as_deref()
            .is_none_or(|name| !name.eq_ignore_ascii_case(brand))
    {
        return false;
    }
    if let Some(min) = filters.price_min
        && product.price < min
    {
        return false;
    }
    if let Some(max) = filters.price_max
        && product.price > max
    {
        return false;
    }
    if let Some(featured) = filters.featured
        && product.is_featured != featured
    {
        return false;
    }
    if let Some(bestseller) = filters.bestseller
        && product.is_bestseller != bestseller
    {
        return false;
    }
    if let Some(is_new) = filters.is_new
        && product.is_new != is_new
    {
        return false;
    }
    if let Some(search) = &filters.search {
        let needle = search.to_lowercase();
        let in_name = product.name.to_lowercase().contains(&needle);
        let in_description = product
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle));
        if !in_name && !in_description {
            return false;
        }
    }
    true
}

fn sort_products(products: &mut [&Product], sort_by: SortBy, sort_order: SortOrder) {
    products.sort_by(|a, b| {
        let ordering = match sort_by {
            SortBy::Name => a.name.cmp(&b.name),
            SortBy::Price => a.price.cmp(&b.price),
            SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
            SortBy::Rating => a
                .avg_rating
                .partial_cmp(&b.avg_rating)
                .unwrap_or(core::cmp::Ordering::Equal),
            SortBy::ReviewCount => a.review_count.cmp(&b.review_count),
        };
        match sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

struct Seed {
    id: i32,
    name: &'static str,
    description: &'static str,
    price: &'static str,
    compare_price: Option<&'static str>,
    category_id: i32,
    category_name: &'static str,
    brand: (i32, &'static str),
    sized: bool,
    featured: bool,
    bestseller: bool,
    is_new: bool,
    rating: f64,
    review_count: i64,
    image: &'static str,
    created: (i32, u32, u32),
}

/// Apparel products carry the full size run as variants, in display order.
fn size_variants(product_id: i32) -> Vec<ProductVariant> {
    Size::ALL
        .iter()
        .enumerate()
        .map(|(index, size)| ProductVariant {
            id: VariantId::new(product_id * 10 + i32::try_from(index).unwrap_or(0)),
            name: "Size".to_owned(),
            value: size.as_str().to_owned(),
            price_adjustment: Decimal::ZERO,
            stock_quantity: 10,
        })
        .collect()
}

fn build(seed: &Seed) -> Product {
    let created_at = day(seed.created.0, seed.created.1, seed.created.2);
    Product {
        id: ProductId::new(seed.id),
        name: seed.name.to_owned(),
        description: Some(seed.description.to_owned()),
        short_description: None,
        sku: Some(format!("MG-{:04}", seed.id)),
        price: seed.price.parse().unwrap_or(Decimal::ZERO),
        compare_price: seed.compare_price.and_then(|p| p.parse().ok()),
        category_id: Some(CategoryId::new(seed.category_id)),
        category_name: Some(seed.category_name.to_owned()),
        brand_id: Some(BrandId::new(seed.brand.0)),
        brand_name: Some(seed.brand.1.to_owned()),
        is_active: true,
        is_featured: seed.featured,
        is_bestseller: seed.bestseller,
        is_new: seed.is_new,
        in_stock: true,
        stock_quantity: 25,
        avg_rating: seed.rating,
        review_count: seed.review_count,
        primary_image: Some(seed.image.to_owned()),
        images: vec![ProductImage {
            id: ImageId::new(seed.id),
            url: seed.image.to_owned(),
            alt_text: Some(seed.name.to_owned()),
            is_primary: true,
            sort_order: 0,
        }],
        variants: if seed.sized {
            size_variants(seed.id)
        } else {
            Vec::new()
        },
        specifications: Vec::new(),
        created_at,
        updated_at: created_at,
    }
}

fn seed_products() -> Vec<Product> {
    let seeds = [
        Seed {
            id: 1,
            name: "Classic Oxford Shirt",
            description: "Button-down oxford in breathable cotton, cut for everyday wear.",
            price: "49.99",
            compare_price: Some("69.99"),
            category_id: 1,
            category_name: "Shirts",
            brand: (1, "Marigold Basics"),
            sized: true,
            featured: true,
            bestseller: true,
            is_new: false,
            rating: 4.6,
            review_count: 128,
            image: "/images/products/oxford-shirt.jpg",
            created: (2025, 1, 12),
        },
        Seed {
            id: 2,
            name: "Linen Camp Collar Shirt",
            description: "Relaxed camp collar shirt in garment-washed linen.",
            price: "54.99",
            compare_price: None,
            category_id: 1,
            category_name: "Shirts",
            brand: (2, "Coastline"),
            sized: true,
            featured: false,
            bestseller: false,
            is_new: true,
            rating: 4.2,
            review_count: 34,
            image: "/images/products/linen-camp-shirt.jpg",
            created: (2025, 6, 3),
        },
        Seed {
            id: 3,
            name: "Slim Stretch Chinos",
            description: "Slim-tapered chinos with two-way stretch and a garment dye finish.",
            price: "59.99",
            compare_price: Some("79.99"),
            category_id: 2,
            category_name: "Trousers",
            brand: (1, "Marigold Basics"),
            sized: true,
            featured: true,
            bestseller: false,
            is_new: false,
            rating: 4.4,
            review_count: 86,
            image: "/images/products/stretch-chinos.jpg",
            created: (2025, 2, 20),
        },
        Seed {
            id: 4,
            name: "Selvedge Denim Jeans",
            description: "14oz selvedge denim on a straight cut, raw indigo.",
            price: "119.00",
            compare_price: None,
            category_id: 2,
            category_name: "Trousers",
            brand: (3, "Ironweave"),
            sized: true,
            featured: false,
            bestseller: true,
            is_new: false,
            rating: 4.8,
            review_count: 212,
            image: "/images/products/selvedge-jeans.jpg",
            created: (2024, 11, 5),
        },
        Seed {
            id: 5,
            name: "Merino Crewneck Sweater",
            description: "Fine-gauge merino crewneck, machine washable.",
            price: "89.00",
            compare_price: Some("110.00"),
            category_id: 3,
            category_name: "Knitwear",
            brand: (2, "Coastline"),
            sized: true,
            featured: true,
            bestseller: false,
            is_new: true,
            rating: 4.5,
            review_count: 57,
            image: "/images/products/merino-crewneck.jpg",
            created: (2025, 7, 14),
        },
        Seed {
            id: 6,
            name: "Waffle-Knit Cardigan",
            description: "Chunky waffle-knit cardigan with horn buttons.",
            price: "74.50",
            compare_price: None,
            category_id: 3,
            category_name: "Knitwear",
            brand: (3, "Ironweave"),
            sized: true,
            featured: false,
            bestseller: false,
            is_new: false,
            rating: 4.0,
            review_count: 19,
            image: "/images/products/waffle-cardigan.jpg",
            created: (2025, 3, 8),
        },
        Seed {
            id: 7,
            name: "Canvas Weekender Bag",
            description: "Waxed canvas weekender with leather trim and brass hardware.",
            price: "139.00",
            compare_price: Some("165.00"),
            category_id: 4,
            category_name: "Accessories",
            brand: (4, "Field & Forge"),
            sized: false,
            featured: false,
            bestseller: true,
            is_new: false,
            rating: 4.7,
            review_count: 143,
            image: "/images/products/canvas-weekender.jpg",
            created: (2024, 12, 1),
        },
        Seed {
            id: 8,
            name: "Woven Leather Belt",
            description: "Hand-woven full-grain leather belt with a solid brass buckle.",
            price: "45.00",
            compare_price: None,
            category_id: 4,
            category_name: "Accessories",
            brand: (4, "Field & Forge"),
            sized: false,
            featured: false,
            bestseller: false,
            is_new: true,
            rating: 4.3,
            review_count: 41,
            image: "/images/products/woven-belt.jpg",
            created: (2025, 8, 2),
        },
    ];
    seeds.iter().map(build).collect()
}

fn seed_categories() -> Vec<Category> {
    let names = [
        (1, "Shirts", 2_i64),
        (2, "Trousers", 2),
        (3, "Knitwear", 2),
        (4, "Accessories", 2),
    ];
    names
        .into_iter()
        .enumerate()
        .map(|(index, (id, name, product_count))| Category {
            id: CategoryId::new(id),
            name: name.to_owned(),
            description: None,
            image_url: None,
            parent_id: None,
            parent_name: None,
            is_active: true,
            sort_order: i32::try_from(index).unwrap_or(0),
            product_count,
            created_at: day(2024, 10, 1),
            updated_at: day(2024, 10, 1),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_listing_is_newest_first() {
        let catalog = StaticCatalog::new();
        let page = catalog.find_all(&ProductFilters::latest(20));
        assert_eq!(page.total, 8);
        let dates: Vec<_> = page.items.iter().map(|p| p.created_at).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_category_filter() {
        let catalog = StaticCatalog::new();
        let filters = ProductFilters {
            category: Some("shirts".to_owned()),
            ..ProductFilters::latest(20)
        };
        let page = catalog.find_all(&filters);
        assert_eq!(page.total, 2);
        assert!(page
            .items
            .iter()
            .all(|p| p.category_name.as_deref() == Some("Shirts")));
    }

    #[test]
    fn test_search_matches_description() {
        let catalog = StaticCatalog::new();
        let filters = ProductFilters {
            search: Some("selvedge".to_owned()),
            ..ProductFilters::latest(20)
        };
        let page = catalog.find_all(&filters);
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Selvedge Denim Jeans");
    }

    #[test]
    fn test_price_sort_ascending() {
        let catalog = StaticCatalog::new();
        let filters = ProductFilters {
            sort_by: SortBy::Price,
            sort_order: SortOrder::Asc,
            ..ProductFilters::latest(20)
        };
        let page = catalog.find_all(&filters);
        let prices: Vec<_> = page.items.iter().map(|p| p.price).collect();
        let mut sorted = prices.clone();
        sorted.sort();
        assert_eq!(prices, sorted);
    }

    #[test]
    fn test_paging() {
        let catalog = StaticCatalog::new();
        let filters = ProductFilters {
            limit: 3,
            offset: 6,
            ..ProductFilters::default()
        };
        let page = catalog.find_all(&filters);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.page, 3);
        assert_eq!(page.total, 8);
    }

    #[test]
    fn test_related_backfills_across_categories() {
        let catalog = StaticCatalog::new();
        // Shirts has only one sibling, so a request for four related
        // products pulls three from other categories.
        let related = catalog.related(ProductId::new(1), 4);
        assert_eq!(related.len(), 4);
        assert!(related.iter().all(|p| p.id != ProductId::new(1)));
        assert_eq!(
            related
                .iter()
                .filter(|p| p.category_name.as_deref() == Some("Shirts"))
                .count(),
            1
        );
    }

    #[test]
    fn test_related_unknown_product_is_empty() {
        let catalog = StaticCatalog::new();
        assert!(catalog.related(ProductId::new(999), 4).is_empty());
    }

    #[test]
    fn test_apparel_carries_the_size_run() {
        let catalog = StaticCatalog::new();

        let shirt = catalog.find_by_id(ProductId::new(1)).unwrap();
        assert_eq!(shirt.variants.len(), Size::ALL.len());
        assert!(shirt
            .variants
            .iter()
            .all(|v| v.name == "Size" && Size::parse(&v.value).is_some()));

        // Accessories have no size axis.
        let bag = catalog.find_by_id(ProductId::new(7)).unwrap();
        assert!(bag.variants.is_empty());
    }

    #[test]
    fn test_featured_filter() {
        let catalog = StaticCatalog::new();
        let filters = ProductFilters {
            featured: Some(true),
            ..ProductFilters::latest(20)
        };
        let page = catalog.find_all(&filters);
        assert_eq!(page.total, 3);
        assert!(page.items.iter().all(|p| p.is_featured));
    }
}
