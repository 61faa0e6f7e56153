use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use planbook_core::error::CoreError;
use serde::Serialize;

/// Body of every error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A failed request, carrying the status and the message shown to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        if !err.is_client_error() {
            tracing::error!(error = %err, source = ?std::error::Error::source(&err), "request failed");
            return ApiError::internal();
        }

        match err {
            CoreError::InvalidInput(msg) => ApiError::bad_request(msg),
            err @ CoreError::RecurrenceWindowTooLarge { .. } => ApiError::bad_request(err.to_string()),
            CoreError::InvalidCredentials => ApiError::unauthorized("Invalid credentials"),
            CoreError::Forbidden(msg) => ApiError::forbidden(msg),
            CoreError::NotFound(msg) => ApiError::not_found(msg),
            CoreError::Conflict(msg) => ApiError::new(StatusCode::CONFLICT, msg),
            _ => ApiError::internal(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// `Json` extractor whose rejections use the API's error body.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
