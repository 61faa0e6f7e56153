//! To-do endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use planbook_core::{
    models::{NewTodoData, Todo, TodoList, UpdateTodoData},
    repository::TodoRepository,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiJson};
use crate::routes::{nullable, parse_id, parse_optional_id, MessageResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
}

/// Request body for creating a to-do.
///
/// `category` is the priority list label (`"A List"`, `"B List"`, `"C List"`);
/// `categoryId` files the to-do under one of the caller's categories.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub category_id: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub category_id: Option<Option<String>>,
    pub completed: Option<bool>,
}

fn parse_list(label: Option<&str>) -> Result<Option<TodoList>, ApiError> {
    label
        .map(|l| l.parse::<TodoList>().map_err(|e| ApiError::bad_request(e.to_string())))
        .transpose()
}

/// GET /api/todos
async fn list_todos(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.repo().find_todos(user.id).await?;
    Ok(Json(todos))
}

/// POST /api/todos
async fn create_todo(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let data = NewTodoData {
        title: req.title.unwrap_or_default(),
        description: req.description,
        list: parse_list(req.category.as_deref())?,
        category_id: parse_optional_id(req.category_id.as_deref(), "category ID")?,
        completed: req.completed,
    };
    let todo = state.repo().add_todo(user.id, data).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// GET /api/todos/{id}
async fn get_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let todo = state.repo().find_todo_by_id(user.id, parse_id(&id)?).await?;
    Ok(Json(todo))
}

/// PUT /api/todos/{id}
async fn update_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateTodoRequest>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    let category_id = match req.category_id {
        None => None,
        Some(raw) => Some(parse_optional_id(raw.as_deref(), "category ID")?),
    };
    let data = UpdateTodoData {
        title: req.title,
        description: req.description,
        list: parse_list(req.category.as_deref())?,
        category_id,
        completed: req.completed,
    };
    let todo = state.repo().update_todo(user.id, id, data).await?;
    Ok(Json(todo))
}

/// DELETE /api/todos/{id}
async fn delete_todo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.repo().delete_todo(user.id, parse_id(&id)?).await?;
    Ok(Json(MessageResponse::new("ToDo successfully deleted")))
}
