use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use planbook_core::db::establish_connection;
use planbook_core::error::CoreError;
use planbook_core::models::*;
use planbook_core::recurrence::{ExpansionConfig, RecurrenceExpander};
use planbook_core::repository::{
    CategoryRepository, EventRepository, JournalRepository, SqliteRepository, TodoRepository,
    UserRepository,
};
use tempfile::TempDir;
use uuid::Uuid;

/// Helper function to create a test database
async fn setup_test_db() -> (SqliteRepository, TempDir) {
    setup_test_db_with(ExpansionConfig::default()).await
}

async fn setup_test_db_with(config: ExpansionConfig) -> (SqliteRepository, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");

    let pool = establish_connection(&db_path.to_string_lossy(), 5)
        .await
        .expect("Failed to establish test database connection");

    (SqliteRepository::new(pool, RecurrenceExpander::new(config)), temp_dir)
}

/// Helper function to create a test user
async fn create_test_user(repo: &SqliteRepository, username: &str) -> User {
    repo.add_user(NewUserData {
        username: username.to_string(),
        password_hash: "$argon2id$v=19$placeholder".to_string(),
        email: None,
    })
    .await
    .expect("Failed to create test user")
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn event_template(recurrence: Recurrence, until: Option<NaiveDate>) -> EventTemplate {
    let start = at(2024, 1, 1, 9);
    EventTemplate {
        title: "Gym".to_string(),
        start,
        end: start + Duration::hours(1),
        todo_id: None,
        description: Some("leg day".to_string()),
        recurrence,
        recurrence_end_date: until,
    }
}

#[tokio::test]
async fn test_user_registration_and_lookup() {
    let (repo, _temp_dir) = setup_test_db().await;

    let user = create_test_user(&repo, "  grace  ").await;
    assert_eq!(user.username, "grace");

    let by_name = repo.find_user_by_username("grace").await.unwrap().unwrap();
    assert_eq!(by_name.id, user.id);
    assert_eq!(by_name.password_hash, user.password_hash);

    let by_id = repo.find_user_by_id(user.id).await.unwrap();
    assert!(by_id.is_some());

    let duplicate = repo
        .add_user(NewUserData {
            username: "grace".to_string(),
            password_hash: "x".to_string(),
            email: None,
        })
        .await;
    assert!(matches!(duplicate, Err(CoreError::Conflict(_))));
}

#[tokio::test]
async fn test_todo_crud_and_ownership() {
    let (repo, _temp_dir) = setup_test_db().await;
    let alice = create_test_user(&repo, "alice").await;
    let bob = create_test_user(&repo, "bob").await;

    let todo = repo
        .add_todo(
            alice.id,
            NewTodoData {
                title: "Buy milk".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(todo.description, DEFAULT_TODO_DESCRIPTION);
    assert_eq!(todo.list, TodoList::A);
    assert!(!todo.completed);

    let missing_title = repo.add_todo(alice.id, NewTodoData::default()).await;
    assert!(matches!(missing_title, Err(CoreError::InvalidInput(_))));

    let updated = repo
        .update_todo(
            alice.id,
            todo.id,
            UpdateTodoData {
                completed: Some(true),
                list: Some(TodoList::C),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.completed);
    assert_eq!(updated.list, TodoList::C);
    assert_eq!(updated.title, "Buy milk");

    // Bob can neither see, edit nor delete Alice's to-do
    assert!(repo.find_todos(bob.id).await.unwrap().is_empty());
    assert!(matches!(
        repo.find_todo_by_id(bob.id, todo.id).await,
        Err(CoreError::Forbidden(_))
    ));
    assert!(matches!(
        repo.delete_todo(bob.id, todo.id).await,
        Err(CoreError::Forbidden(_))
    ));

    repo.delete_todo(alice.id, todo.id).await.unwrap();
    assert!(matches!(
        repo.find_todo_by_id(alice.id, todo.id).await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_categories_are_unique_per_user_and_unlink_on_delete() {
    let (repo, _temp_dir) = setup_test_db().await;
    let alice = create_test_user(&repo, "alice").await;
    let bob = create_test_user(&repo, "bob").await;

    let work = repo.add_category(alice.id, "Work".to_string()).await.unwrap();
    let duplicate = repo.add_category(alice.id, " Work ".to_string()).await;
    assert!(matches!(duplicate, Err(CoreError::Conflict(_))));

    // Same title is fine for somebody else
    repo.add_category(bob.id, "Work".to_string()).await.unwrap();

    let todo = repo
        .add_todo(
            alice.id,
            NewTodoData {
                title: "Report".to_string(),
                category_id: Some(work.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(todo.category_id, Some(work.id));

    let foreign = repo
        .add_todo(
            bob.id,
            NewTodoData {
                title: "Sneaky".to_string(),
                category_id: Some(work.id),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(foreign, Err(CoreError::InvalidInput(_))));

    let renamed = repo
        .rename_category(alice.id, work.id, "Office".to_string())
        .await
        .unwrap();
    assert_eq!(renamed.title, "Office");

    repo.delete_category(alice.id, work.id).await.unwrap();
    let todo = repo.find_todo_by_id(alice.id, todo.id).await.unwrap();
    assert_eq!(todo.category_id, None);
    assert_eq!(repo.find_categories(alice.id).await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_journal_entries_with_tags_and_paging() {
    let (repo, _temp_dir) = setup_test_db().await;
    let alice = create_test_user(&repo, "alice").await;

    for day in 1..=5u32 {
        repo.add_entry(
            alice.id,
            NewJournalEntryData {
                title: format!("Day {day}"),
                content: "Wrote some code".to_string(),
                date: Some(at(2024, 2, day, 20)),
                tags: if day % 2 == 0 {
                    vec!["rust".to_string(), " work ".to_string(), "rust".to_string()]
                } else {
                    vec![]
                },
            },
        )
        .await
        .unwrap();
    }

    let all = repo.find_entries(alice.id, &JournalQuery::default()).await.unwrap();
    let titles: Vec<&str> = all.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Day 5", "Day 4", "Day 3", "Day 2", "Day 1"]);
    assert_eq!(all[1].tags, vec!["rust".to_string(), "work".to_string()]);
    assert!(all[0].tags.is_empty());

    let tagged = repo
        .find_entries(
            alice.id,
            &JournalQuery {
                tag: Some("rust".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(tagged.len(), 2);
    // The tag filter must not hide the entry's other tags
    assert!(tagged.iter().all(|e| e.tags.len() == 2));

    let page_two = repo
        .find_entries(
            alice.id,
            &JournalQuery {
                page: Some(2),
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let titles: Vec<&str> = page_two.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Day 3", "Day 2"]);

    let entry = all[0].clone();
    let updated = repo
        .update_entry(
            alice.id,
            entry.id,
            UpdateJournalEntryData {
                content: Some("Rewrote it".to_string()),
                tags: Some(vec!["done".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.content, "Rewrote it");
    assert_eq!(updated.tags, vec!["done".to_string()]);
    let reloaded = repo.find_entry_by_id(alice.id, entry.id).await.unwrap();
    assert_eq!(reloaded, updated);
}

#[tokio::test]
async fn test_journal_page_without_limit_uses_default_page_size() {
    let (repo, _temp_dir) = setup_test_db().await;
    let alice = create_test_user(&repo, "alice").await;

    let total = JournalQuery::DEFAULT_LIMIT + 3;
    for n in 0..total {
        repo.add_entry(
            alice.id,
            NewJournalEntryData {
                title: format!("Entry {n}"),
                content: "Text".to_string(),
                date: Some(at(2024, 3, 1, 0) + Duration::hours(i64::from(n))),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    let page = |page: u32| JournalQuery {
        page: Some(page),
        ..Default::default()
    };
    let first = repo.find_entries(alice.id, &page(1)).await.unwrap();
    assert_eq!(first.len(), JournalQuery::DEFAULT_LIMIT as usize);
    assert_eq!(first[0].title, format!("Entry {}", total - 1));

    let second = repo.find_entries(alice.id, &page(2)).await.unwrap();
    let titles: Vec<&str> = second.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Entry 2", "Entry 1", "Entry 0"]);

    let err = repo.find_entries(alice.id, &page(0)).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));

    // No paging parameters returns everything
    let all = repo.find_entries(alice.id, &JournalQuery::default()).await.unwrap();
    assert_eq!(all.len(), total as usize);
}

#[tokio::test]
async fn test_journal_bulk_delete_is_owner_scoped() {
    let (repo, _temp_dir) = setup_test_db().await;
    let alice = create_test_user(&repo, "alice").await;
    let bob = create_test_user(&repo, "bob").await;

    let mut ids = Vec::new();
    for owner in [alice.id, alice.id, bob.id] {
        let entry = repo
            .add_entry(
                owner,
                NewJournalEntryData {
                    title: "Note".to_string(),
                    content: "Text".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        ids.push(entry.id);
    }

    let deleted = repo.delete_entries(alice.id, &ids).await.unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(repo.find_entries(bob.id, &JournalQuery::default()).await.unwrap().len(), 1);
    assert_eq!(repo.delete_entries(alice.id, &[]).await.unwrap(), 0);
}

#[tokio::test]
async fn test_recurring_event_is_stored_as_one_group() {
    let (repo, _temp_dir) = setup_test_db().await;
    let alice = create_test_user(&repo, "alice").await;

    let created = repo
        .add_event(alice.id, event_template(Recurrence::Daily, NaiveDate::from_ymd_opt(2024, 1, 3)))
        .await
        .unwrap();
    assert_eq!(created.len(), 3);

    let stored = repo.find_events(alice.id, EventWindow::default()).await.unwrap();
    assert_eq!(stored, created);
    let group = stored[0].group_id.unwrap();
    assert!(stored.iter().all(|e| e.group_id == Some(group) && e.is_recurring));
    assert_eq!(stored[2].occurrence_date, Some(at(2024, 1, 3, 9)));
}

#[tokio::test]
async fn test_large_group_spans_several_insert_batches() {
    let (repo, _temp_dir) = setup_test_db_with(ExpansionConfig {
        max_occurrences: 1000,
        max_batch_size: 7,
    })
    .await;
    let alice = create_test_user(&repo, "alice").await;

    let created = repo
        .add_event(alice.id, event_template(Recurrence::Daily, NaiveDate::from_ymd_opt(2024, 2, 19)))
        .await
        .unwrap();
    assert_eq!(created.len(), 50);
    assert_eq!(repo.find_events(alice.id, EventWindow::default()).await.unwrap().len(), 50);
}

#[tokio::test]
async fn test_failed_batch_leaves_no_partial_group() {
    let (repo, _temp_dir) = setup_test_db_with(ExpansionConfig {
        max_occurrences: 100,
        max_batch_size: 2,
    })
    .await;
    let alice = create_test_user(&repo, "alice").await;

    let mut occurrences = RecurrenceExpander::default()
        .expand(&event_template(Recurrence::Daily, NaiveDate::from_ymd_opt(2024, 1, 5)), alice.id)
        .unwrap();
    // Reusing an id makes the last statement of the transaction fail
    let first_id = occurrences[0].id;
    occurrences[4].id = first_id;

    let result = repo.insert_events(occurrences).await;
    assert!(matches!(result, Err(CoreError::Database(_))));
    assert!(repo.find_events(alice.id, EventWindow::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_runaway_recurrence_is_rejected_before_storing() {
    let (repo, _temp_dir) = setup_test_db_with(ExpansionConfig {
        max_occurrences: 30,
        ..Default::default()
    })
    .await;
    let alice = create_test_user(&repo, "alice").await;

    let result = repo
        .add_event(alice.id, event_template(Recurrence::Daily, NaiveDate::from_ymd_opt(2030, 1, 1)))
        .await;
    assert!(matches!(result, Err(CoreError::RecurrenceWindowTooLarge { limit: 30 })));
    assert!(repo.find_events(alice.id, EventWindow::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_editing_one_occurrence_does_not_cascade() {
    let (repo, _temp_dir) = setup_test_db().await;
    let alice = create_test_user(&repo, "alice").await;

    let created = repo
        .add_event(alice.id, event_template(Recurrence::Weekly, NaiveDate::from_ymd_opt(2024, 1, 22)))
        .await
        .unwrap();
    assert_eq!(created.len(), 4);

    let moved = repo
        .update_event(
            alice.id,
            created[1].id,
            UpdateEventData {
                title: Some("Gym (moved)".to_string()),
                start: Some(at(2024, 1, 9, 18)),
                end: Some(at(2024, 1, 9, 19)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.title, "Gym (moved)");
    assert_eq!(moved.group_id, created[1].group_id);

    repo.delete_event(alice.id, created[2].id).await.unwrap();

    let remaining = repo.find_events(alice.id, EventWindow::default()).await.unwrap();
    assert_eq!(remaining.len(), 3);
    assert_eq!(remaining.iter().filter(|e| e.title == "Gym").count(), 2);

    let bad_edit = repo
        .update_event(
            alice.id,
            created[0].id,
            UpdateEventData {
                end: Some(at(2023, 12, 31, 0)),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(bad_edit, Err(CoreError::InvalidInput(_))));
}

#[tokio::test]
async fn test_event_window_and_ownership() {
    let (repo, _temp_dir) = setup_test_db().await;
    let alice = create_test_user(&repo, "alice").await;
    let bob = create_test_user(&repo, "bob").await;

    repo.add_event(alice.id, event_template(Recurrence::Daily, NaiveDate::from_ymd_opt(2024, 1, 10)))
        .await
        .unwrap();

    let window = EventWindow {
        from: Some(at(2024, 1, 3, 0)),
        to: Some(at(2024, 1, 5, 23)),
    };
    let in_window = repo.find_events(alice.id, window).await.unwrap();
    assert_eq!(in_window.len(), 3);

    assert!(repo.find_events(bob.id, EventWindow::default()).await.unwrap().is_empty());
    let alices = repo.find_events(alice.id, EventWindow::default()).await.unwrap();
    assert!(matches!(
        repo.delete_event(bob.id, alices[0].id).await,
        Err(CoreError::Forbidden(_))
    ));
    assert!(matches!(
        repo.find_event_by_id(alice.id, Uuid::now_v7()).await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_event_linked_todo_must_belong_to_owner() {
    let (repo, _temp_dir) = setup_test_db().await;
    let alice = create_test_user(&repo, "alice").await;
    let bob = create_test_user(&repo, "bob").await;

    let bobs_todo = repo
        .add_todo(
            bob.id,
            NewTodoData {
                title: "Bob's".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut template = event_template(Recurrence::None, None);
    template.todo_id = Some(bobs_todo.id);
    let result = repo.add_event(alice.id, template.clone()).await;
    assert!(matches!(result, Err(CoreError::InvalidInput(_))));

    let created = repo.add_event(bob.id, template).await.unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].todo_id, Some(bobs_todo.id));
    assert_eq!(created[0].group_id, None);
}
