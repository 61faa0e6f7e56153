use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    CalendarEvent, Category, EventTemplate, EventWindow, JournalEntry, JournalQuery,
    NewJournalEntryData, NewTodoData, NewUserData, Todo, UpdateEventData,
    UpdateJournalEntryData, UpdateTodoData, User,
};
use crate::recurrence::RecurrenceExpander;
use async_trait::async_trait;
use uuid::Uuid;

pub mod categories;
pub mod events;
pub mod journal;
pub mod todos;
pub mod users;

/// Domain-specific trait for user accounts
#[async_trait]
pub trait UserRepository {
    async fn add_user(&self, data: NewUserData) -> Result<User, CoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, CoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, CoreError>;
}

/// Domain-specific trait for to-do categories
#[async_trait]
pub trait CategoryRepository {
    async fn add_category(&self, owner: Uuid, title: String) -> Result<Category, CoreError>;
    async fn find_categories(&self, owner: Uuid) -> Result<Vec<Category>, CoreError>;
    async fn find_category_by_id(&self, owner: Uuid, id: Uuid) -> Result<Category, CoreError>;
    async fn rename_category(&self, owner: Uuid, id: Uuid, title: String) -> Result<Category, CoreError>;
    async fn delete_category(&self, owner: Uuid, id: Uuid) -> Result<(), CoreError>;
}

/// Domain-specific trait for to-dos
#[async_trait]
pub trait TodoRepository {
    async fn add_todo(&self, owner: Uuid, data: NewTodoData) -> Result<Todo, CoreError>;
    async fn find_todos(&self, owner: Uuid) -> Result<Vec<Todo>, CoreError>;
    async fn find_todo_by_id(&self, owner: Uuid, id: Uuid) -> Result<Todo, CoreError>;
    async fn update_todo(&self, owner: Uuid, id: Uuid, data: UpdateTodoData) -> Result<Todo, CoreError>;
    async fn delete_todo(&self, owner: Uuid, id: Uuid) -> Result<(), CoreError>;
}

/// Domain-specific trait for journal entries
#[async_trait]
pub trait JournalRepository {
    async fn add_entry(&self, owner: Uuid, data: NewJournalEntryData) -> Result<JournalEntry, CoreError>;
    async fn find_entries(&self, owner: Uuid, query: &JournalQuery) -> Result<Vec<JournalEntry>, CoreError>;
    async fn find_entry_by_id(&self, owner: Uuid, id: Uuid) -> Result<JournalEntry, CoreError>;
    async fn update_entry(&self, owner: Uuid, id: Uuid, data: UpdateJournalEntryData) -> Result<JournalEntry, CoreError>;
    async fn delete_entry(&self, owner: Uuid, id: Uuid) -> Result<(), CoreError>;
    async fn delete_entries(&self, owner: Uuid, ids: &[Uuid]) -> Result<u64, CoreError>;
}

/// Domain-specific trait for calendar events
#[async_trait]
pub trait EventRepository {
    /// Expands `template` and stores every occurrence in one transaction.
    async fn add_event(&self, owner: Uuid, template: EventTemplate) -> Result<Vec<CalendarEvent>, CoreError>;
    /// Stores already-expanded occurrences atomically: all of them or none.
    async fn insert_events(&self, events: Vec<CalendarEvent>) -> Result<Vec<CalendarEvent>, CoreError>;
    async fn find_events(&self, owner: Uuid, window: EventWindow) -> Result<Vec<CalendarEvent>, CoreError>;
    async fn find_event_by_id(&self, owner: Uuid, id: Uuid) -> Result<CalendarEvent, CoreError>;
    async fn update_event(&self, owner: Uuid, id: Uuid, data: UpdateEventData) -> Result<CalendarEvent, CoreError>;
    async fn delete_event(&self, owner: Uuid, id: Uuid) -> Result<(), CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository:
    UserRepository + CategoryRepository + TodoRepository + JournalRepository + EventRepository
{
}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
    expander: RecurrenceExpander,
}

impl SqliteRepository {
    pub fn new(pool: DbPool, expander: RecurrenceExpander) -> Self {
        Self { pool, expander }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub(crate) fn expander(&self) -> &RecurrenceExpander {
        &self.expander
    }
}

impl Repository for SqliteRepository {}

/// Resolves the outcome of an owner-scoped lookup.
///
/// `record` is the row fetched by id alone; it is returned only when it belongs
/// to `owner`. Missing rows are `NotFound` and foreign rows are `Forbidden`.
pub(crate) fn check_owner<T>(
    record: Option<T>,
    owner: Uuid,
    owner_of: impl FnOnce(&T) -> Uuid,
    what: &str,
) -> Result<T, CoreError> {
    let record = record.ok_or_else(|| CoreError::NotFound(format!("{what} not found")))?;
    if owner_of(&record) != owner {
        return Err(CoreError::Forbidden(format!("Not authorized to access this {what}")));
    }
    Ok(record)
}
