use crate::error::CoreError;
use crate::models::{CalendarEvent, EventTemplate, EventWindow, UpdateEventData};
use crate::repository::{check_owner, EventRepository, SqliteRepository, TodoRepository};
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

impl SqliteRepository {
    /// An event may only link to one of its owner's own to-dos.
    async fn ensure_todo_linkable(&self, owner: Uuid, todo_id: Option<Uuid>) -> Result<(), CoreError> {
        if let Some(todo_id) = todo_id {
            match self.find_todo_by_id(owner, todo_id).await {
                Ok(_) => {}
                Err(CoreError::NotFound(_)) | Err(CoreError::Forbidden(_)) => {
                    return Err(CoreError::InvalidInput("Invalid todo ID".to_string()));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EventRepository for SqliteRepository {
    async fn add_event(&self, owner: Uuid, template: EventTemplate) -> Result<Vec<CalendarEvent>, CoreError> {
        let occurrences = self.expander().expand(&template, owner)?;
        self.ensure_todo_linkable(owner, template.todo_id).await?;
        self.insert_events(occurrences).await
    }

    async fn insert_events(&self, events: Vec<CalendarEvent>) -> Result<Vec<CalendarEvent>, CoreError> {
        if events.is_empty() {
            return Ok(events);
        }

        // One transaction for the whole group; chunking only bounds the bind count per statement
        let mut tx = self.pool().begin().await?;
        for chunk in events.chunks(self.expander().config().max_batch_size.max(1)) {
            let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO calendar_events (id, user_id, title, start_at, end_at, todo_id, description, \
                 recurrence, recurrence_end_date, group_id, is_recurring, occurrence_date) ",
            );
            query_builder.push_values(chunk.iter(), |mut b, event| {
                b.push_bind(event.id)
                    .push_bind(event.user_id)
                    .push_bind(event.title.clone())
                    .push_bind(event.start)
                    .push_bind(event.end)
                    .push_bind(event.todo_id)
                    .push_bind(event.description.clone())
                    .push_bind(event.recurrence)
                    .push_bind(event.recurrence_end_date)
                    .push_bind(event.group_id)
                    .push_bind(event.is_recurring)
                    .push_bind(event.occurrence_date);
            });
            query_builder.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::debug!(count = events.len(), "stored calendar events");
        Ok(events)
    }

    async fn find_events(&self, owner: Uuid, window: EventWindow) -> Result<Vec<CalendarEvent>, CoreError> {
        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM calendar_events WHERE user_id = ");
        query_builder.push_bind(owner);

        if let Some(from) = window.from {
            query_builder.push(" AND start_at >= ");
            query_builder.push_bind(from);
        }
        if let Some(to) = window.to {
            query_builder.push(" AND start_at <= ");
            query_builder.push_bind(to);
        }
        query_builder.push(" ORDER BY start_at, id");

        let events = query_builder.build_query_as().fetch_all(self.pool()).await?;
        Ok(events)
    }

    async fn find_event_by_id(&self, owner: Uuid, id: Uuid) -> Result<CalendarEvent, CoreError> {
        let event: Option<CalendarEvent> = sqlx::query_as("SELECT * FROM calendar_events WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        check_owner(event, owner, |e| e.user_id, "Calendar event")
    }

    async fn update_event(&self, owner: Uuid, id: Uuid, data: UpdateEventData) -> Result<CalendarEvent, CoreError> {
        let mut event = self.find_event_by_id(owner, id).await?;

        if let Some(title) = data.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(CoreError::InvalidInput("title must not be empty".to_string()));
            }
            event.title = title.to_string();
        }
        if let Some(start) = data.start {
            event.start = start;
        }
        if let Some(end) = data.end {
            event.end = end;
        }
        if event.end < event.start {
            return Err(CoreError::InvalidInput("end must not be before start".to_string()));
        }
        if let Some(todo_id) = data.todo_id {
            self.ensure_todo_linkable(owner, todo_id).await?;
            event.todo_id = todo_id;
        }
        if let Some(description) = data.description {
            event.description = description;
        }

        // Only this occurrence changes; siblings in the same group are left as they are
        let updated: CalendarEvent = sqlx::query_as(
            r#"UPDATE calendar_events
            SET title = $1, start_at = $2, end_at = $3, todo_id = $4, description = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&event.title)
        .bind(event.start)
        .bind(event.end)
        .bind(event.todo_id)
        .bind(&event.description)
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| CoreError::NotFound("Calendar event not found".to_string()))?;

        Ok(updated)
    }

    async fn delete_event(&self, owner: Uuid, id: Uuid) -> Result<(), CoreError> {
        self.find_event_by_id(owner, id).await?;

        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound("Calendar event not found".to_string()));
        }
        Ok(())
    }
}
