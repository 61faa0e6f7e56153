use crate::error::CoreError;
use crate::models::{JournalEntry, JournalQuery, NewJournalEntryData, UpdateJournalEntryData};
use crate::repository::{check_owner, JournalRepository, SqliteRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, Transaction};
use uuid::Uuid;

/// Separator used by GROUP_CONCAT when collecting tags (ASCII unit separator).
const TAG_SEPARATOR: char = '\u{1f}';

const SELECT_ENTRIES: &str = r#"SELECT je.id, je.user_id, je.title, je.content, je.date,
        GROUP_CONCAT(jt.tag, char(31)) AS tags
    FROM journal_entries je
    LEFT JOIN journal_entry_tags jt ON jt.entry_id = je.id
    "#;

#[derive(Debug, FromRow)]
struct JournalEntryRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    content: String,
    date: DateTime<Utc>,
    tags: Option<String>,
}

impl From<JournalEntryRow> for JournalEntry {
    fn from(row: JournalEntryRow) -> Self {
        let mut tags: Vec<String> = row
            .tags
            .map(|t| t.split(TAG_SEPARATOR).map(str::to_string).collect())
            .unwrap_or_default();
        tags.sort();
        JournalEntry {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            content: row.content,
            date: row.date,
            tags,
        }
    }
}

/// Trims, drops empties and duplicates, and sorts.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

fn required(value: &str, field: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}

impl SqliteRepository {
    async fn find_entry_unchecked(&self, id: Uuid) -> Result<Option<JournalEntry>, CoreError> {
        let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_ENTRIES);
        query_builder.push(" WHERE je.id = ");
        query_builder.push_bind(id);
        query_builder.push(" GROUP BY je.id");

        let row: Option<JournalEntryRow> = query_builder
            .build_query_as()
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(JournalEntry::from))
    }

    async fn replace_tags_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        entry_id: Uuid,
        tags: &[String],
    ) -> Result<(), CoreError> {
        sqlx::query("DELETE FROM journal_entry_tags WHERE entry_id = $1")
            .bind(entry_id)
            .execute(&mut **tx)
            .await?;

        if !tags.is_empty() {
            let mut query_builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT INTO journal_entry_tags (entry_id, tag) ");
            query_builder.push_values(tags.iter(), |mut b, tag| {
                b.push_bind(entry_id).push_bind(tag);
            });
            query_builder.build().execute(&mut **tx).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl JournalRepository for SqliteRepository {
    async fn add_entry(&self, owner: Uuid, data: NewJournalEntryData) -> Result<JournalEntry, CoreError> {
        required(&data.title, "Title")?;
        required(&data.content, "Content")?;

        let entry = JournalEntry {
            id: Uuid::now_v7(),
            user_id: owner,
            title: data.title.trim().to_string(),
            content: data.content,
            date: data.date.unwrap_or_else(Utc::now),
            tags: normalize_tags(data.tags),
        };

        let mut tx = self.pool().begin().await?;
        sqlx::query(
            r#"INSERT INTO journal_entries (id, user_id, title, content, date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(entry.date)
        .execute(&mut *tx)
        .await?;
        Self::replace_tags_in_transaction(&mut tx, entry.id, &entry.tags).await?;
        tx.commit().await?;

        Ok(entry)
    }

    async fn find_entries(&self, owner: Uuid, query: &JournalQuery) -> Result<Vec<JournalEntry>, CoreError> {
        let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_ENTRIES);
        query_builder.push(" WHERE je.user_id = ");
        query_builder.push_bind(owner);

        if let Some(tag) = query.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query_builder.push(
                " AND EXISTS (SELECT 1 FROM journal_entry_tags f WHERE f.entry_id = je.id AND f.tag = ",
            );
            query_builder.push_bind(tag.to_string());
            query_builder.push(")");
        }

        query_builder.push(" GROUP BY je.id ORDER BY je.date DESC, je.id DESC");

        // A page without a limit uses the default page size.
        let limit = query
            .limit
            .or_else(|| query.page.map(|_| JournalQuery::DEFAULT_LIMIT));
        if let Some(limit) = limit {
            if limit == 0 {
                return Err(CoreError::InvalidInput("limit must be at least 1".to_string()));
            }
            let page = query.page.unwrap_or(1);
            if page == 0 {
                return Err(CoreError::InvalidInput("page must be at least 1".to_string()));
            }
            query_builder.push(" LIMIT ");
            query_builder.push_bind(i64::from(limit));
            query_builder.push(" OFFSET ");
            query_builder.push_bind(i64::from(page - 1) * i64::from(limit));
        }

        let rows: Vec<JournalEntryRow> = query_builder.build_query_as().fetch_all(self.pool()).await?;
        Ok(rows.into_iter().map(JournalEntry::from).collect())
    }

    async fn find_entry_by_id(&self, owner: Uuid, id: Uuid) -> Result<JournalEntry, CoreError> {
        let entry = self.find_entry_unchecked(id).await?;
        check_owner(entry, owner, |e| e.user_id, "Journal entry")
    }

    async fn update_entry(
        &self,
        owner: Uuid,
        id: Uuid,
        data: UpdateJournalEntryData,
    ) -> Result<JournalEntry, CoreError> {
        let mut entry = self.find_entry_by_id(owner, id).await?;

        if let Some(title) = data.title {
            required(&title, "Title")?;
            entry.title = title.trim().to_string();
        }
        if let Some(content) = data.content {
            required(&content, "Content")?;
            entry.content = content;
        }
        if let Some(date) = data.date {
            entry.date = date;
        }

        let mut tx = self.pool().begin().await?;
        sqlx::query("UPDATE journal_entries SET title = $1, content = $2, date = $3 WHERE id = $4")
            .bind(&entry.title)
            .bind(&entry.content)
            .bind(entry.date)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if let Some(tags) = data.tags {
            entry.tags = normalize_tags(tags);
            Self::replace_tags_in_transaction(&mut tx, id, &entry.tags).await?;
        }
        tx.commit().await?;

        Ok(entry)
    }

    async fn delete_entry(&self, owner: Uuid, id: Uuid) -> Result<(), CoreError> {
        self.find_entry_by_id(owner, id).await?;

        let result = sqlx::query("DELETE FROM journal_entries WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound("Journal entry not found".to_string()));
        }
        Ok(())
    }

    async fn delete_entries(&self, owner: Uuid, ids: &[Uuid]) -> Result<u64, CoreError> {
        if ids.is_empty() {
            return Ok(0);
        }

        // Entries belonging to other users are silently left alone
        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("DELETE FROM journal_entries WHERE user_id = ");
        query_builder.push_bind(owner);
        query_builder.push(" AND id IN (");
        let mut separated = query_builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let result = query_builder.build().execute(self.pool()).await?;
        Ok(result.rows_affected())
    }
}
