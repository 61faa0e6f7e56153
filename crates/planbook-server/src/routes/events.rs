//! Calendar event endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use planbook_core::{
    models::{CalendarEvent, EventTemplate, EventWindow, Recurrence, UpdateEventData},
    recurrence::parse_end_date,
    repository::EventRepository,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiJson};
use crate::routes::{nullable, parse_id, parse_instant, parse_optional_id, MessageResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calendar/events", get(list_events).post(create_event))
        .route("/calendar/events/{id}", put(update_event).delete(delete_event))
}

/// Request body for creating an event, possibly recurring
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub todo_id: Option<String>,
    pub description: Option<String>,
    /// `none`, `daily`, `weekly` or `monthly`; anything else means `none`
    pub recurrence: Option<String>,
    /// `YYYY-MM-DD` or an RFC 3339 instant; only the date is used
    pub recurrence_end_date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub todo_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

#[derive(Deserialize, Default)]
pub struct WindowParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

fn required_instant(value: Option<&str>, field: &str) -> Result<DateTime<Utc>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_instant(v, field),
        None => Err(ApiError::bad_request(format!("{field} is required"))),
    }
}

fn optional_instant(value: Option<&str>, field: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| parse_instant(v, field))
        .transpose()
}

impl CreateEventRequest {
    fn into_template(self) -> Result<EventTemplate, ApiError> {
        let title = self.title.unwrap_or_default();
        if title.trim().is_empty() {
            return Err(ApiError::bad_request("title is required"));
        }

        let recurrence_end_date = match self.recurrence_end_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_end_date(raw).ok_or_else(|| {
                ApiError::bad_request("recurrenceEndDate must be a date (YYYY-MM-DD)")
            })?),
        };

        Ok(EventTemplate {
            title,
            start: required_instant(self.start.as_deref(), "start")?,
            end: required_instant(self.end.as_deref(), "end")?,
            todo_id: parse_optional_id(self.todo_id.as_deref(), "todo ID")?,
            description: self.description,
            recurrence: self
                .recurrence
                .as_deref()
                .map(Recurrence::parse_lenient)
                .unwrap_or_default(),
            recurrence_end_date,
        })
    }
}

/// GET /api/calendar/events?from=&to=
async fn list_events(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<WindowParams>,
) -> Result<Json<Vec<CalendarEvent>>, ApiError> {
    let window = EventWindow {
        from: optional_instant(params.from.as_deref(), "from")?,
        to: optional_instant(params.to.as_deref(), "to")?,
    };
    let events = state.repo().find_events(user.id, window).await?;
    Ok(Json(events))
}

/// POST /api/calendar/events
///
/// Responds with every stored occurrence, in chronological order.
async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<Vec<CalendarEvent>>), ApiError> {
    let template = req.into_template()?;
    let events = state.repo().add_event(user.id, template).await?;

    tracing::info!(
        user_id = %user.id,
        count = events.len(),
        group_id = ?events.first().and_then(|e| e.group_id),
        "created calendar event"
    );
    Ok((StatusCode::CREATED, Json(events)))
}

/// PUT /api/calendar/events/{id}
///
/// Changes only the addressed occurrence.
async fn update_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateEventRequest>,
) -> Result<Json<CalendarEvent>, ApiError> {
    let id = parse_id(&id)?;
    let todo_id = match req.todo_id {
        None => None,
        Some(raw) => Some(parse_optional_id(raw.as_deref(), "todo ID")?),
    };
    let data = UpdateEventData {
        title: req.title,
        start: optional_instant(req.start.as_deref(), "start")?,
        end: optional_instant(req.end.as_deref(), "end")?,
        todo_id,
        description: req.description,
    };
    let event = state.repo().update_event(user.id, id, data).await?;
    Ok(Json(event))
}

/// DELETE /api/calendar/events/{id}
async fn delete_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.repo().delete_event(user.id, parse_id(&id)?).await?;
    Ok(Json(MessageResponse::new("Calendar event deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request() -> CreateEventRequest {
        CreateEventRequest {
            title: Some("Standup".to_string()),
            start: Some("2024-01-01T09:00:00Z".to_string()),
            end: Some("2024-01-01T09:15:00Z".to_string()),
            todo_id: None,
            description: None,
            recurrence: Some("weekly".to_string()),
            recurrence_end_date: Some("2024-02-01".to_string()),
        }
    }

    #[test]
    fn test_request_becomes_template() {
        let template = request().into_template().unwrap();
        assert_eq!(template.recurrence, Recurrence::Weekly);
        assert_eq!(template.recurrence_end_date, NaiveDate::from_ymd_opt(2024, 2, 1));
    }

    #[test]
    fn test_unknown_recurrence_means_none() {
        let mut req = request();
        req.recurrence = Some("yearly".to_string());
        assert_eq!(req.into_template().unwrap().recurrence, Recurrence::None);
    }

    #[test]
    fn test_missing_fields_are_bad_requests() {
        let mut req = request();
        req.start = None;
        assert_eq!(req.into_template().unwrap_err().status(), StatusCode::BAD_REQUEST);

        let mut req = request();
        req.recurrence_end_date = Some("someday".to_string());
        assert_eq!(req.into_template().unwrap_err().status(), StatusCode::BAD_REQUEST);

        let mut req = request();
        req.title = Some("   ".to_string());
        assert!(req.into_template().is_err());
    }
}
