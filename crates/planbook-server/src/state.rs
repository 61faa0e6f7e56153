use std::sync::Arc;

use planbook_core::repository::SqliteRepository;

use crate::auth::TokenService;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    repo: Arc<SqliteRepository>,
    tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(repo: SqliteRepository, tokens: TokenService) -> Self {
        Self {
            repo: Arc::new(repo),
            tokens: Arc::new(tokens),
        }
    }

    pub fn repo(&self) -> &SqliteRepository {
        &self.repo
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}
