//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use marigold_core::CategoryId;

use crate::db::CategoryRepository;
use crate::error::{AppError, Result};
use crate::models::{Category, CategoryNode, CategoryUpdate, NewCategory};
use crate::state::AppState;

/// `GET /api/categories`
///
/// Served through the catalog service so listings survive a database
/// outage.
pub async fn index(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.catalog().categories().await)
}

/// `GET /api/categories/roots`
pub async fn roots(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).find_roots().await?;
    Ok(Json(categories))
}

/// `GET /api/categories/{id}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>> {
    state
        .catalog()
        .category(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("category {id} not found")))
}

/// `GET /api/categories/{id}/ancestors`
#[instrument(skip(state))]
pub async fn ancestors(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<Category>>> {
    let repo = CategoryRepository::new(state.pool());
    if repo.find_by_id(id).await?.is_none() {
        return Err(AppError::NotFound(format!("category {id} not found")));
    }
    let chain = repo.ancestors(id).await?;
    Ok(Json(chain))
}

/// `GET /api/categories/{id}/subtree`
#[instrument(skip(state))]
pub async fn subtree(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<CategoryNode>>> {
    let nodes = CategoryRepository::new(state.pool()).descendants(id).await?;
    Ok(Json(nodes))
}

/// `POST /api/categories`
#[instrument(skip(state, new_category))]
pub async fn create(
    State(state): State<AppState>,
    Json(new_category): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>)> {
    if new_category.name.trim().is_empty() {
        return Err(AppError::BadRequest("category name is required".to_owned()));
    }
    let category = CategoryRepository::new(state.pool())
        .create(&new_category)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `PUT /api/categories/{id}`
#[instrument(skip(state, update))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(update): Json<CategoryUpdate>,
) -> Result<Json<Category>> {
    let category = CategoryRepository::new(state.pool()).update(id, &update).await?;
    Ok(Json(category))
}

/// `DELETE /api/categories/{id}`
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    CategoryRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
