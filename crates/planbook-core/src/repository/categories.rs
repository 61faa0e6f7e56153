use crate::error::{conflict_on_unique, CoreError};
use crate::models::Category;
use crate::repository::{check_owner, CategoryRepository, SqliteRepository};
use async_trait::async_trait;
use uuid::Uuid;

const DUPLICATE: &str = "Category already exists";

fn clean_title(title: &str) -> Result<String, CoreError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CoreError::InvalidInput("Title is required".to_string()));
    }
    Ok(title.to_string())
}

impl SqliteRepository {
    async fn find_category_unchecked(&self, id: Uuid) -> Result<Option<Category>, CoreError> {
        let category = sqlx::query_as("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(category)
    }
}

#[async_trait]
impl CategoryRepository for SqliteRepository {
    async fn add_category(&self, owner: Uuid, title: String) -> Result<Category, CoreError> {
        let category = sqlx::query_as(
            r#"INSERT INTO categories (id, user_id, title)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(owner)
        .bind(clean_title(&title)?)
        .fetch_one(self.pool())
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE))?;

        Ok(category)
    }

    async fn find_categories(&self, owner: Uuid) -> Result<Vec<Category>, CoreError> {
        let categories = sqlx::query_as("SELECT * FROM categories WHERE user_id = $1 ORDER BY title")
            .bind(owner)
            .fetch_all(self.pool())
            .await?;
        Ok(categories)
    }

    async fn find_category_by_id(&self, owner: Uuid, id: Uuid) -> Result<Category, CoreError> {
        let category = self.find_category_unchecked(id).await?;
        check_owner(category, owner, |c| c.user_id, "Category")
    }

    async fn rename_category(&self, owner: Uuid, id: Uuid, title: String) -> Result<Category, CoreError> {
        let title = clean_title(&title)?;
        self.find_category_by_id(owner, id).await?;

        let category = sqlx::query_as(
            r#"UPDATE categories SET title = $1
            WHERE id = $2
            RETURNING id, user_id, title
            "#,
        )
        .bind(title)
        .bind(id)
        .fetch_one(self.pool())
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE))?;

        Ok(category)
    }

    async fn delete_category(&self, owner: Uuid, id: Uuid) -> Result<(), CoreError> {
        self.find_category_by_id(owner, id).await?;

        // todos.category_id is cleared by ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound("Category not found".to_string()));
        }
        Ok(())
    }
}
