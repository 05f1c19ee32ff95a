//! Integration tests for Marigold Commerce.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marigold-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_consistency` - Cart store merge, removal, and isolation rules
//! - `order_pricing` - Totals, tax, and shipping derivation
//! - `order_lifecycle` - Status transitions and order numbers
//! - `catalog_fallback` - Static catalog behavior during outages
//!
//! The suites in `tests/` exercise storefront logic through the library
//! crates without a running server; end-to-end HTTP tests against a live
//! database run separately in CI.
