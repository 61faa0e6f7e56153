use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Default description given to a to-do created without one.
pub const DEFAULT_TODO_DESCRIPTION: &str = "Enter a description here";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUserData {
    pub username: String,
    /// Already hashed; see [`crate::password::hash_password`]
    pub password_hash: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
}

// ============================================================================
// To-dos
// ============================================================================

/// The priority list a to-do is filed under.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum TodoList {
    #[default]
    #[serde(rename = "A List")]
    #[sqlx(rename = "A List")]
    A,
    #[serde(rename = "B List")]
    #[sqlx(rename = "B List")]
    B,
    #[serde(rename = "C List")]
    #[sqlx(rename = "C List")]
    C,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid to-do list: {0}")]
pub struct ParseTodoListError(String);

impl FromStr for TodoList {
    type Err = ParseTodoListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a list" | "a" => Ok(TodoList::A),
            "b list" | "b" => Ok(TodoList::B),
            "c list" | "c" => Ok(TodoList::C),
            _ => Err(ParseTodoListError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "category")]
    pub list: TodoList,
    pub category_id: Option<Uuid>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTodoData {
    pub title: String,
    pub description: Option<String>,
    pub list: Option<TodoList>,
    pub category_id: Option<Uuid>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTodoData {
    pub title: Option<String>,
    pub description: Option<String>,
    pub list: Option<TodoList>,
    pub category_id: Option<Option<Uuid>>,
    pub completed: Option<bool>,
}

// ============================================================================
// Journal
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewJournalEntryData {
    pub title: String,
    pub content: String,
    pub date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateJournalEntryData {
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
}

/// Listing options for journal entries. `page` is 1-based.
#[derive(Debug, Clone, Default)]
pub struct JournalQuery {
    pub tag: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl JournalQuery {
    /// Page size used when `page` is given without `limit`
    pub const DEFAULT_LIMIT: u32 = 10;
}

// ============================================================================
// Calendar
// ============================================================================

/// How a calendar event repeats.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid recurrence: {0}")]
pub struct ParseRecurrenceError(String);

impl FromStr for Recurrence {
    type Err = ParseRecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(Recurrence::None),
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            _ => Err(ParseRecurrenceError(s.to_string())),
        }
    }
}

impl Recurrence {
    /// Parses a rule, treating anything unrecognized as `None`.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|err: ParseRecurrenceError| {
            tracing::debug!(%err, "unrecognized recurrence rule, treating as none");
            Recurrence::None
        })
    }

    pub fn is_recurring(self) -> bool {
        self != Recurrence::None
    }
}

impl std::fmt::Display for Recurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recurrence::None => write!(f, "none"),
            Recurrence::Daily => write!(f, "daily"),
            Recurrence::Weekly => write!(f, "weekly"),
            Recurrence::Monthly => write!(f, "monthly"),
        }
    }
}

/// A calendar event as submitted by a client, before expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTemplate {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub todo_id: Option<Uuid>,
    pub description: Option<String>,
    pub recurrence: Recurrence,
    /// Inclusive, date only
    pub recurrence_end_date: Option<NaiveDate>,
}

/// One stored occurrence of a calendar event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[sqlx(rename = "start_at")]
    pub start: DateTime<Utc>,
    #[sqlx(rename = "end_at")]
    pub end: DateTime<Utc>,
    pub todo_id: Option<Uuid>,
    pub description: Option<String>,
    pub recurrence: Recurrence,
    pub recurrence_end_date: Option<NaiveDate>,
    /// Shared by every occurrence expanded from one template; `None` for one-off events
    pub group_id: Option<Uuid>,
    pub is_recurring: bool,
    pub occurrence_date: Option<DateTime<Utc>>,
}

/// Edits applied to a single occurrence. Never cascades to the rest of its group.
#[derive(Debug, Clone, Default)]
pub struct UpdateEventData {
    pub title: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub todo_id: Option<Option<Uuid>>,
    pub description: Option<Option<String>>,
}

/// Optional time window for listing events; both bounds inclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
