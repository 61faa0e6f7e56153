//! # Planbook Server
//!
//! HTTP API over [`planbook_core`]: account sign-up and sign-in with bearer
//! tokens, and per-user to-dos, categories, journal entries and calendar events.
//!
//! - [`config`]: layered configuration (defaults, `planbook.toml`, `PLANBOOK_*` env)
//! - [`auth`]: token issuing and the [`auth::AuthUser`] extractor
//! - [`routes`]: handlers, one module per resource
//! - [`error`]: mapping of core errors to HTTP responses

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use planbook_core::{db, recurrence::RecurrenceExpander, repository::SqliteRepository};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenService;
use crate::config::{Config, ConfigError};
use crate::state::AppState;

/// The full application: every route plus CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::router()
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to open database: {0}")]
    Database(#[from] planbook_core::error::CoreError),
}

/// Opens (and migrates) the database and assembles the shared state from `config`.
pub async fn build_state(config: &Config) -> Result<AppState, StartupError> {
    let secret = config.auth.secret()?;
    let ttl = config.auth.token_ttl()?;
    let pool = db::establish_connection(&config.database.path, config.database.max_connections).await?;
    let repo = SqliteRepository::new(pool, RecurrenceExpander::new((&config.recurrence).into()));
    let tokens = TokenService::new(secret, ttl);
    Ok(AppState::new(repo, tokens))
}
