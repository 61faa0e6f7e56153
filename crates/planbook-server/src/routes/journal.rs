//! Journal endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use planbook_core::{
    models::{JournalEntry, JournalQuery, NewJournalEntryData, UpdateJournalEntryData},
    repository::JournalRepository,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiJson};
use crate::routes::{parse_id, parse_instant, MessageResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/journal", get(list_entries).post(create_entry))
        .route("/journal/bulk-delete", post(bulk_delete))
        .route("/journal/{id}", get(get_entry).put(update_entry).delete(delete_entry))
}

/// Query string of `GET /api/journal`; numbers arrive as text and are checked here
#[derive(Deserialize, Default)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub tag: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateEntryRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct UpdateEntryRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct BulkDeleteRequest {
    #[serde(default)]
    pub ids: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResponse {
    pub message: String,
    pub deleted_count: u64,
}

fn parse_positive(value: Option<&str>, field: &str) -> Result<Option<u32>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => match v.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(ApiError::bad_request(format!("{field} must be a positive integer"))),
        },
    }
}

/// GET /api/journal?page=&limit=&tag=
async fn list_entries(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<JournalEntry>>, ApiError> {
    let query = JournalQuery {
        tag: params.tag,
        page: parse_positive(params.page.as_deref(), "page")?,
        limit: parse_positive(params.limit.as_deref(), "limit")?,
    };
    let entries = state.repo().find_entries(user.id, &query).await?;
    Ok(Json(entries))
}

/// POST /api/journal
async fn create_entry(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateEntryRequest>,
) -> Result<(StatusCode, Json<JournalEntry>), ApiError> {
    let data = NewJournalEntryData {
        title: req.title,
        content: req.content,
        date: req.date.as_deref().map(|d| parse_instant(d, "date")).transpose()?,
        tags: req.tags,
    };
    let entry = state.repo().add_entry(user.id, data).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/journal/{id}
async fn get_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<JournalEntry>, ApiError> {
    let entry = state.repo().find_entry_by_id(user.id, parse_id(&id)?).await?;
    Ok(Json(entry))
}

/// PUT /api/journal/{id}
async fn update_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateEntryRequest>,
) -> Result<Json<JournalEntry>, ApiError> {
    let id = parse_id(&id)?;
    let data = UpdateJournalEntryData {
        title: req.title,
        content: req.content,
        date: req.date.as_deref().map(|d| parse_instant(d, "date")).transpose()?,
        tags: req.tags,
    };
    let entry = state.repo().update_entry(user.id, id, data).await?;
    Ok(Json(entry))
}

/// DELETE /api/journal/{id}
async fn delete_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.repo().delete_entry(user.id, parse_id(&id)?).await?;
    Ok(Json(MessageResponse::new("Journal entry successfully deleted")))
}

/// POST /api/journal/bulk-delete
///
/// Ids that do not belong to the caller are skipped, not reported.
async fn bulk_delete(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, ApiError> {
    let ids = req
        .ids
        .iter()
        .map(|id| parse_id(id))
        .collect::<Result<Vec<Uuid>, _>>()?;
    let deleted_count = state.repo().delete_entries(user.id, &ids).await?;

    tracing::debug!(user_id = %user.id, deleted_count, "bulk deleted journal entries");
    Ok(Json(BulkDeleteResponse {
        message: format!("{deleted_count} journal entries deleted"),
        deleted_count,
    }))
}
