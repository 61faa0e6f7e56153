use crate::error::{conflict_on_unique, CoreError};
use crate::models::{NewUserData, User};
use crate::repository::{SqliteRepository, UserRepository};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn add_user(&self, data: NewUserData) -> Result<User, CoreError> {
        let username = data.username.trim();
        if username.is_empty() {
            return Err(CoreError::InvalidInput("username is required".to_string()));
        }

        let user = User {
            id: Uuid::now_v7(),
            username: username.to_string(),
            password_hash: data.password_hash,
            email: data.email.filter(|e| !e.trim().is_empty()),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO users (id, username, password_hash, email, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(user.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| conflict_on_unique(e, "Username already taken"))?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, CoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, CoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username.trim())
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }
}
