//! Order route handlers.
//!
//! Creation prices the order server-side: the client sends cart lines and
//! an optional discount, and tax and shipping are computed from the
//! configured rates before the transaction runs.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use marigold_core::{OrderId, OrderStatus, PaymentStatus, UserId};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::models::{
    NewOrder, NewOrderAddress, NewOrderItem, Order, OrderFilters, OrderUpdate,
};
use crate::services::pricing;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

/// Request body for order creation. Totals are not accepted from the
/// client; they are derived from the items and the pricing config.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub items: Vec<NewOrderItem>,
    #[serde(default)]
    pub shipping_address: Option<NewOrderAddress>,
    #[serde(default)]
    pub billing_address: Option<NewOrderAddress>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub discount_amount: Decimal,
}

/// Query parameters for the order listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderListQuery {
    pub user_id: Option<UserId>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

/// `POST /api/orders`
#[instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    if request.items.is_empty() {
        return Err(AppError::BadRequest(
            "order must contain at least one item".to_owned(),
        ));
    }
    for item in &request.items {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest(format!(
                "item {} has a non-positive quantity",
                item.product_id
            )));
        }
    }
    if request.discount_amount < Decimal::ZERO {
        return Err(AppError::BadRequest("discount cannot be negative".to_owned()));
    }

    let subtotal: Decimal = request.items.iter().map(|item| item.line_total).sum();
    let quote = pricing::quote(&state.config().pricing, subtotal, request.discount_amount);

    let new_order = NewOrder {
        user_id: request.user_id,
        items: request.items,
        shipping_address: request.shipping_address,
        billing_address: request.billing_address,
        payment_method: request.payment_method,
        notes: request.notes,
        subtotal: quote.subtotal,
        tax_amount: quote.tax_amount,
        shipping_amount: quote.shipping_amount,
        discount_amount: quote.discount_amount,
    };

    let order = OrderRepository::new(state.pool()).create(&new_order).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders`
#[instrument(skip(state, query))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<Order>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let page = query.page.unwrap_or(1).max(1);
    let filters = OrderFilters {
        user_id: query.user_id,
        status: query.status,
        payment_status: query.payment_status,
        date_from: query.date_from,
        date_to: query.date_to,
        limit,
        offset: (page - 1) * limit,
    };

    let orders = OrderRepository::new(state.pool()).find_all(&filters).await?;
    Ok(Json(orders))
}

/// `GET /api/orders/{id}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    OrderRepository::new(state.pool())
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))
}

/// `GET /api/orders/number/{number}`
#[instrument(skip(state))]
pub async fn show_by_number(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<Order>> {
    OrderRepository::new(state.pool())
        .find_by_order_number(&number)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("order {number} not found")))
}

/// `PUT /api/orders/{id}`
#[instrument(skip(state, update))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(update): Json<OrderUpdateRequest>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .update(id, &update.into_update())
        .await?;
    Ok(Json(order))
}

/// Request body for the general order update.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderUpdateRequest {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl OrderUpdateRequest {
    fn into_update(self) -> OrderUpdate {
        OrderUpdate {
            status: self.status,
            payment_status: self.payment_status,
            payment_method: self.payment_method,
            notes: self.notes,
            shipped_at: self.shipped_at,
            delivered_at: self.delivered_at,
        }
    }
}

/// `PUT /api/orders/{id}/status`
#[instrument(skip(state))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .update_status(id, request.status)
        .await?;
    Ok(Json(order))
}

/// `PUT /api/orders/{id}/payment`
#[instrument(skip(state))]
pub async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<PaymentStatusRequest>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .update_payment_status(id, request.payment_status)
        .await?;
    Ok(Json(order))
}

/// `POST /api/orders/{id}/cancel`
#[instrument(skip(state, request))]
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<CancelRequest>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .cancel(id, request.reason.as_deref())
        .await?;
    Ok(Json(order))
}
