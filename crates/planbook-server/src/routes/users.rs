//! Account endpoints: sign-up, sign-in and sign-out

use axum::{extract::State, routing::post, Json, Router};
use planbook_core::{
    error::CoreError,
    models::{NewUserData, User},
    password::{hash_password, verify_password},
    repository::UserRepository,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiJson};
use crate::routes::MessageResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(signup))
        .route("/users/signin", post(signin))
        .route("/users/signout", post(signout))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct SigninRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub token: String,
}

/// Runs CPU-heavy password work off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, CoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password task panicked");
            ApiError::internal()
        })?
        .map_err(ApiError::from)
}

/// POST /api/users/signup
async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if req.username.trim().is_empty() || req.password.is_empty() || req.confirm_password.is_empty() {
        return Err(ApiError::bad_request("All fields are required"));
    }
    if req.password != req.confirm_password {
        return Err(ApiError::bad_request("Password and Confirm Password must match"));
    }

    let password = req.password;
    let password_hash = blocking(move || hash_password(&password)).await?;
    let user = state
        .repo()
        .add_user(NewUserData {
            username: req.username,
            password_hash,
            email: req.email,
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user signed up");
    let token = state.tokens().issue(&user)?;
    Ok(Json(SessionResponse { user, token }))
}

/// POST /api/users/signin
async fn signin(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SigninRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let user = state
        .repo()
        .find_user_by_username(&req.username)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let password = req.password;
    let hash = user.password_hash.clone();
    blocking(move || verify_password(&password, &hash)).await?;

    let token = state.tokens().issue(&user)?;
    Ok(Json(SessionResponse { user, token }))
}

/// POST /api/users/signout
///
/// Tokens are stateless; the client simply forgets its token.
async fn signout() -> Json<MessageResponse> {
    Json(MessageResponse::new("Signout successful"))
}
