use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{CalendarEvent, EventTemplate, Recurrence};

impl Recurrence {
    /// Start of the `n`-th occurrence counted from `anchor` (the 0-th is the anchor itself).
    ///
    /// Monthly steps are taken from the anchor rather than from the previous
    /// occurrence and land on the last day of shorter months, so a series
    /// starting on the 31st stays on month ends instead of drifting.
    /// Returns `None` for non-recurring rules or when the date leaves chrono's range.
    pub fn nth_occurrence(self, anchor: DateTime<Utc>, n: u32) -> Option<DateTime<Utc>> {
        match self {
            Recurrence::None => (n == 0).then_some(anchor),
            Recurrence::Daily => anchor.checked_add_signed(Duration::days(i64::from(n))),
            Recurrence::Weekly => anchor.checked_add_signed(Duration::weeks(i64::from(n))),
            Recurrence::Monthly => anchor.checked_add_months(Months::new(n)),
        }
    }
}

/// Limits applied when expanding and storing recurring events.
#[derive(Debug, Clone)]
pub struct ExpansionConfig {
    /// Hard cap on occurrences produced by one expansion
    pub max_occurrences: usize,
    /// Rows per multi-row INSERT when storing an expansion
    pub max_batch_size: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_occurrences: 1000,
            max_batch_size: 200,
        }
    }
}

/// Turns an [`EventTemplate`] into the concrete occurrences to store.
///
/// Expansion is pure: it validates the template, walks the rule from the
/// template start up to and including the recurrence end date, and returns the
/// occurrences in chronological order. Persisting them is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct RecurrenceExpander {
    config: ExpansionConfig,
}

impl RecurrenceExpander {
    pub fn new(config: ExpansionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    /// Expands `template` for `owner`.
    ///
    /// # Behavior
    /// - `Recurrence::None`: one occurrence equal to the template, no group, not flagged recurring
    /// - Otherwise one occurrence per rule step whose UTC date is on or before
    ///   `recurrence_end_date` (a missing end date means the start date), all
    ///   sharing a fresh group id and keeping the template's duration
    /// - More than `max_occurrences` steps fails with `RecurrenceWindowTooLarge`
    ///   before anything further is generated
    pub fn expand(&self, template: &EventTemplate, owner: Uuid) -> Result<Vec<CalendarEvent>, CoreError> {
        Self::validate(template)?;

        if !template.recurrence.is_recurring() {
            return Ok(vec![Self::occurrence(template, owner, template.start, None)]);
        }

        let until = template
            .recurrence_end_date
            .unwrap_or_else(|| template.start.date_naive());
        let group_id = Uuid::now_v7();
        let too_large = || CoreError::RecurrenceWindowTooLarge {
            limit: self.config.max_occurrences,
        };

        let mut occurrences = Vec::new();
        for n in 0u32.. {
            let cursor = template
                .recurrence
                .nth_occurrence(template.start, n)
                .ok_or_else(too_large)?;
            if cursor.date_naive() > until {
                break;
            }
            if occurrences.len() >= self.config.max_occurrences {
                return Err(too_large());
            }
            occurrences.push(Self::occurrence(template, owner, cursor, Some(group_id)));
        }

        tracing::debug!(
            %group_id,
            recurrence = %template.recurrence,
            count = occurrences.len(),
            "expanded recurring event"
        );
        Ok(occurrences)
    }

    fn validate(template: &EventTemplate) -> Result<(), CoreError> {
        if template.title.trim().is_empty() {
            return Err(CoreError::InvalidInput("title is required".to_string()));
        }
        if template.end < template.start {
            return Err(CoreError::InvalidInput("end must not be before start".to_string()));
        }
        if let Some(until) = template.recurrence_end_date {
            if template.recurrence.is_recurring() && until < template.start.date_naive() {
                return Err(CoreError::InvalidInput(
                    "recurrenceEndDate must not be before start".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn occurrence(
        template: &EventTemplate,
        owner: Uuid,
        start: DateTime<Utc>,
        group_id: Option<Uuid>,
    ) -> CalendarEvent {
        CalendarEvent {
            id: Uuid::now_v7(),
            user_id: owner,
            title: template.title.trim().to_string(),
            start,
            end: start + (template.end - template.start),
            todo_id: template.todo_id,
            description: template.description.clone(),
            recurrence: template.recurrence,
            recurrence_end_date: template.recurrence_end_date,
            group_id,
            is_recurring: group_id.is_some(),
            occurrence_date: group_id.map(|_| start),
        }
    }
}

/// Parses a recurrence end date given either as `YYYY-MM-DD` or as an RFC 3339 instant.
pub fn parse_end_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}
