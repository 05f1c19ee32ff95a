//! Domain services that sit between the HTTP layer and the repositories:
//! the cart store, the fallback-aware catalog, and checkout pricing.

pub mod cart;
pub mod catalog;
pub mod pricing;
pub mod static_catalog;

pub use cart::{AddToCart, CartEvent, CartStore, InMemoryStore, KeyValueStore};
pub use catalog::CatalogService;
pub use pricing::{PricingQuote, quote};
pub use static_catalog::StaticCatalog;
