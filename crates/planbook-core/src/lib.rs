//! # Planbook Core Library
//!
//! Storage and domain logic behind the Planbook productivity service: per-user
//! to-dos, categories, journal entries and calendar events.
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`recurrence`]: Expansion of recurring calendar events into occurrences
//! - [`repository`]: Data access layer with Repository pattern
//! - [`password`]: Argon2 password hashing
//! - [`error`]: Error types shared by every layer
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chrono::{Duration, NaiveDate, TimeZone, Utc};
//! use planbook_core::{
//!     db, models::{EventTemplate, Recurrence},
//!     recurrence::{ExpansionConfig, RecurrenceExpander},
//!     repository::{EventRepository, SqliteRepository},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = db::establish_connection("planbook.db", 5).await?;
//!     let repo = SqliteRepository::new(pool, RecurrenceExpander::new(ExpansionConfig::default()));
//!
//!     let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
//!     let template = EventTemplate {
//!         title: "Standup".to_string(),
//!         start,
//!         end: start + Duration::minutes(15),
//!         todo_id: None,
//!         description: None,
//!         recurrence: Recurrence::Daily,
//!         recurrence_end_date: NaiveDate::from_ymd_opt(2024, 1, 5),
//!     };
//!
//!     # let owner = uuid::Uuid::now_v7();
//!     let occurrences = repo.add_event(owner, template).await?;
//!     println!("Stored {} occurrences", occurrences.len());
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod password;
pub mod recurrence;
pub mod repository;
