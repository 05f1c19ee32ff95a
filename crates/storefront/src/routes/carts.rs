//! Cart route handlers.
//!
//! The cart key in the path names a stored cart; callers use one key per
//! visitor. Quantities are clamped to a per-line maximum at this layer,
//! before the store's merge logic runs.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use marigold_core::{Money, ProductId};

use crate::models::Cart;
use crate::services::AddToCart;
use crate::state::AppState;

/// Per-line quantity cap enforced at the API boundary.
const MAX_LINE_QUANTITY: u32 = 10;

/// Body identifying one cart line by its composite key.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    pub id: ProductId,
    #[serde(default)]
    pub selected_color: Option<String>,
    #[serde(default)]
    pub selected_size: Option<String>,
}

/// Body for a quantity update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityUpdate {
    #[serde(flatten)]
    pub line: LineKey,
    pub quantity: i64,
}

/// Cart totals plus the display price in the storefront currency.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub count: u32,
    pub total: rust_decimal::Decimal,
    pub display_total: String,
}

/// `GET /api/carts/{key}`
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(key): Path<String>) -> Json<Cart> {
    Json(state.carts().cart(&key).await)
}

/// `POST /api/carts/{key}/items`
#[instrument(skip(state, input))]
pub async fn add(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(mut input): Json<AddToCart>,
) -> Json<Cart> {
    input.quantity = input.quantity.clamp(1, MAX_LINE_QUANTITY);
    Json(state.carts().add(&key, input).await)
}

/// `PUT /api/carts/{key}/items`
///
/// A quantity of zero removes the line; positive quantities are capped
/// at the per-line maximum.
#[instrument(skip(state, update))]
pub async fn update_quantity(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(update): Json<QuantityUpdate>,
) -> Json<Cart> {
    let quantity = update.quantity.min(i64::from(MAX_LINE_QUANTITY));
    let cart = state
        .carts()
        .update_quantity(
            &key,
            update.line.id,
            update.line.selected_color.as_deref(),
            update.line.selected_size.as_deref(),
            quantity,
        )
        .await;
    Json(cart)
}

/// `DELETE /api/carts/{key}/items`
#[instrument(skip(state, line))]
pub async fn remove(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(line): Json<LineKey>,
) -> Json<Cart> {
    let cart = state
        .carts()
        .remove(
            &key,
            line.id,
            line.selected_color.as_deref(),
            line.selected_size.as_deref(),
        )
        .await;
    Json(cart)
}

/// `DELETE /api/carts/{key}`
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>, Path(key): Path<String>) -> Json<Cart> {
    Json(state.carts().clear(&key).await)
}

/// `GET /api/carts/{key}/summary`
#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<CartSummary> {
    let cart = state.carts().cart(&key).await;
    let total = cart.total();
    let display_total = Money::new(total).display_inr(state.config().pricing.usd_to_inr);

    Json(CartSummary {
        count: cart.count(),
        total,
        display_total,
    })
}
