use crate::error::CoreError;
use crate::models::{NewTodoData, Todo, UpdateTodoData, DEFAULT_TODO_DESCRIPTION};
use crate::repository::{check_owner, CategoryRepository, SqliteRepository, TodoRepository};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

impl SqliteRepository {
    /// A to-do may only be filed under one of its owner's own categories.
    async fn ensure_category_usable(&self, owner: Uuid, category_id: Option<Uuid>) -> Result<(), CoreError> {
        if let Some(category_id) = category_id {
            match self.find_category_by_id(owner, category_id).await {
                Ok(_) => {}
                Err(CoreError::NotFound(_)) | Err(CoreError::Forbidden(_)) => {
                    return Err(CoreError::InvalidInput("Invalid category ID".to_string()));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TodoRepository for SqliteRepository {
    async fn add_todo(&self, owner: Uuid, data: NewTodoData) -> Result<Todo, CoreError> {
        let title = data.title.trim();
        if title.is_empty() {
            return Err(CoreError::InvalidInput("Title is required".to_string()));
        }
        self.ensure_category_usable(owner, data.category_id).await?;

        let todo = Todo {
            id: Uuid::now_v7(),
            user_id: owner,
            title: title.to_string(),
            description: data
                .description
                .unwrap_or_else(|| DEFAULT_TODO_DESCRIPTION.to_string()),
            list: data.list.unwrap_or_default(),
            category_id: data.category_id,
            completed: data.completed.unwrap_or(false),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO todos (id, user_id, title, description, list, category_id, completed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(todo.id)
        .bind(todo.user_id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.list)
        .bind(todo.category_id)
        .bind(todo.completed)
        .bind(todo.created_at)
        .execute(self.pool())
        .await?;

        Ok(todo)
    }

    async fn find_todos(&self, owner: Uuid) -> Result<Vec<Todo>, CoreError> {
        let todos = sqlx::query_as("SELECT * FROM todos WHERE user_id = $1 ORDER BY created_at, id")
            .bind(owner)
            .fetch_all(self.pool())
            .await?;
        Ok(todos)
    }

    async fn find_todo_by_id(&self, owner: Uuid, id: Uuid) -> Result<Todo, CoreError> {
        let todo: Option<Todo> = sqlx::query_as("SELECT * FROM todos WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        check_owner(todo, owner, |t| t.user_id, "ToDo")
    }

    async fn update_todo(&self, owner: Uuid, id: Uuid, data: UpdateTodoData) -> Result<Todo, CoreError> {
        let mut todo = self.find_todo_by_id(owner, id).await?;

        if let Some(title) = data.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(CoreError::InvalidInput("Title must not be empty".to_string()));
            }
            todo.title = title.to_string();
        }
        if let Some(description) = data.description {
            todo.description = description;
        }
        if let Some(list) = data.list {
            todo.list = list;
        }
        if let Some(category_id) = data.category_id {
            self.ensure_category_usable(owner, category_id).await?;
            todo.category_id = category_id;
        }
        if let Some(completed) = data.completed {
            todo.completed = completed;
        }

        let updated: Todo = sqlx::query_as(
            r#"UPDATE todos
            SET title = $1, description = $2, list = $3, category_id = $4, completed = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.list)
        .bind(todo.category_id)
        .bind(todo.completed)
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| CoreError::NotFound("ToDo not found".to_string()))?;

        Ok(updated)
    }

    async fn delete_todo(&self, owner: Uuid, id: Uuid) -> Result<(), CoreError> {
        self.find_todo_by_id(owner, id).await?;

        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound("ToDo not found".to_string()));
        }
        Ok(())
    }
}
