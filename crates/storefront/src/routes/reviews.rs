//! Review route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use marigold_core::{ProductId, ReviewId, UserId};

use crate::db::ReviewRepository;
use crate::error::Result;
use crate::models::{
    NewReview, ProductReviewStats, Review, ReviewEligibility, ReviewUpdate,
};
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 50;

/// Query parameters for a product's review listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewListQuery {
    pub sort_by: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Query parameters for the eligibility check.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityQuery {
    pub user_id: UserId,
    pub product_id: ProductId,
}

/// `POST /api/reviews`
#[instrument(skip(state, new_review))]
pub async fn create(
    State(state): State<AppState>,
    Json(new_review): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>)> {
    let review = ReviewRepository::new(state.pool()).create(&new_review).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// `GET /api/reviews/product/{id}`
#[instrument(skip(state, query))]
pub async fn for_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<Vec<Review>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let page = query.page.unwrap_or(1).max(1);

    let reviews = ReviewRepository::new(state.pool())
        .find_by_product(product_id, query.sort_by.as_deref(), limit, (page - 1) * limit)
        .await?;
    Ok(Json(reviews))
}

/// `GET /api/reviews/product/{id}/stats`
#[instrument(skip(state))]
pub async fn stats(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ProductReviewStats>> {
    let stats = ReviewRepository::new(state.pool()).product_stats(product_id).await?;
    Ok(Json(stats))
}

/// `GET /api/reviews/eligibility`
#[instrument(skip(state))]
pub async fn eligibility(
    State(state): State<AppState>,
    Query(query): Query<EligibilityQuery>,
) -> Result<Json<ReviewEligibility>> {
    let eligibility = ReviewRepository::new(state.pool())
        .can_review(query.user_id, query.product_id)
        .await?;
    Ok(Json(eligibility))
}

/// `PUT /api/reviews/{id}`
#[instrument(skip(state, update))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
    Json(update): Json<ReviewUpdate>,
) -> Result<Json<Review>> {
    let review = ReviewRepository::new(state.pool()).update(id, &update).await?;
    Ok(Json(review))
}

/// `DELETE /api/reviews/{id}`
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode> {
    ReviewRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/reviews/{id}/helpful`
#[instrument(skip(state))]
pub async fn helpful(
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> Result<Json<Review>> {
    let review = ReviewRepository::new(state.pool()).increment_helpful(id).await?;
    Ok(Json(review))
}
