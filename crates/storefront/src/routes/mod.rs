//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! # Products
//! GET    /api/products                  - Product listing (filter/sort/page)
//! GET    /api/products/featured         - Featured products
//! GET    /api/products/bestsellers      - Bestselling products
//! GET    /api/products/new-arrivals     - New arrivals
//! GET    /api/products/{id}             - Product detail
//! GET    /api/products/{id}/related     - Related products
//! PUT    /api/products/{id}             - Update product fields
//! DELETE /api/products/{id}             - Deactivate product
//!
//! # Categories
//! GET    /api/categories                - All active categories
//! GET    /api/categories/roots          - Root categories
//! GET    /api/categories/{id}           - Category detail
//! GET    /api/categories/{id}/ancestors - Strict ancestors, root first
//! GET    /api/categories/{id}/subtree   - Descendants, breadth-ordered
//! POST   /api/categories                - Create category
//! PUT    /api/categories/{id}           - Update category
//! DELETE /api/categories/{id}           - Delete category (refused if in use)
//!
//! # Orders
//! POST   /api/orders                    - Create order (atomic)
//! GET    /api/orders                    - Order listing
//! GET    /api/orders/{id}               - Order detail
//! GET    /api/orders/number/{number}    - Order lookup by order number
//! PUT    /api/orders/{id}               - Update mutable order fields
//! PUT    /api/orders/{id}/status        - Transition order status
//! PUT    /api/orders/{id}/payment       - Set payment status
//! POST   /api/orders/{id}/cancel        - Cancel and restore stock
//!
//! # Reviews
//! POST   /api/reviews                   - Create review
//! GET    /api/reviews/product/{id}        - Approved reviews for a product
//! GET    /api/reviews/product/{id}/stats  - Aggregate rating stats
//! GET    /api/reviews/eligibility         - Can this user review this product
//! PUT    /api/reviews/{id}              - Update review
//! DELETE /api/reviews/{id}              - Delete review
//! POST   /api/reviews/{id}/helpful      - Increment helpful count
//!
//! # Carts
//! GET    /api/carts/{key}               - Read cart
//! DELETE /api/carts/{key}               - Clear cart
//! POST   /api/carts/{key}/items         - Add line (merges variants)
//! PUT    /api/carts/{key}/items         - Set line quantity (0 removes)
//! DELETE /api/carts/{key}/items         - Remove line
//! GET    /api/carts/{key}/summary       - Count, total, and display price
//! ```

pub mod carts;
pub mod categories;
pub mod orders;
pub mod products;
pub mod reviews;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/featured", get(products::featured))
        .route("/bestsellers", get(products::bestsellers))
        .route("/new-arrivals", get(products::new_arrivals))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::deactivate),
        )
        .route("/{id}/related", get(products::related))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route("/roots", get(categories::roots))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::remove),
        )
        .route("/{id}/ancestors", get(categories::ancestors))
        .route("/{id}/subtree", get(categories::subtree))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::index))
        .route("/{id}", get(orders::show).put(orders::update))
        .route("/number/{number}", get(orders::show_by_number))
        .route("/{id}/status", put(orders::update_status))
        .route("/{id}/payment", put(orders::update_payment))
        .route("/{id}/cancel", post(orders::cancel))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(reviews::create))
        .route("/product/{id}", get(reviews::for_product))
        .route("/product/{id}/stats", get(reviews::stats))
        .route("/eligibility", get(reviews::eligibility))
        .route("/{id}", put(reviews::update).delete(reviews::remove))
        .route("/{id}/helpful", post(reviews::helpful))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/{key}", get(carts::show).delete(carts::clear))
        .route(
            "/{key}/items",
            post(carts::add)
                .put(carts::update_quantity)
                .delete(carts::remove),
        )
        .route("/{key}/summary", get(carts::summary))
}

/// Create all routes for the storefront API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes())
        .nest("/api/categories", category_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/reviews", review_routes())
        .nest("/api/carts", cart_routes())
}
