//! Domain models for the storefront.
//!
//! These are the shapes the API serves and the repositories return.
//! Database row structs live in the `db` module; models carry the joined,
//! aggregated view of an entity (category name on a product, review
//! aggregates, address snapshots on an order).

pub mod cart;
pub mod category;
pub mod order;
pub mod page;
pub mod product;
pub mod review;

pub use cart::{Cart, CartLineItem};
pub use category::{Category, CategoryNode, CategoryUpdate, NewCategory};
pub use order::{
    NewOrder, NewOrderAddress, NewOrderItem, Order, OrderAddress, OrderFilters, OrderItem,
    OrderUpdate,
};
pub use page::Page;
pub use product::{
    Product, ProductFilters, ProductImage, ProductSpecification, ProductUpdate, ProductVariant,
    SortBy, SortOrder,
};
pub use review::{
    NewReview, ProductReviewStats, RatingDistribution, Review, ReviewEligibility, ReviewUpdate,
};
