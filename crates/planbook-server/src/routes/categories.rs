//! Category endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use planbook_core::{models::Category, repository::CategoryRepository};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiJson};
use crate::routes::{parse_id, MessageResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", put(rename_category).delete(delete_category))
}

#[derive(Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub title: String,
}

/// GET /api/categories
async fn list_categories(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state.repo().find_categories(user.id).await?;
    Ok(Json(categories))
}

/// POST /api/categories
async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state.repo().add_category(user.id, req.title).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id}
async fn rename_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<CategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let category = state
        .repo()
        .rename_category(user.id, parse_id(&id)?, req.title)
        .await?;
    Ok(Json(category))
}

/// DELETE /api/categories/{id}
async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.repo().delete_category(user.id, parse_id(&id)?).await?;
    Ok(Json(MessageResponse::new("Category deleted")))
}
