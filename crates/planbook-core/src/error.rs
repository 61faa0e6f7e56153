use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("recurrence window too large: more than {limit} occurrences")]
    RecurrenceWindowTooLarge { limit: usize },

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

impl CoreError {
    /// True when the error was caused by the caller rather than by the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::NotFound(_)
                | CoreError::InvalidInput(_)
                | CoreError::Forbidden(_)
                | CoreError::Conflict(_)
                | CoreError::InvalidCredentials
                | CoreError::RecurrenceWindowTooLarge { .. }
        )
    }
}

/// Maps a SQLite unique-constraint violation to `Conflict`, leaving other errors untouched.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> CoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            CoreError::Conflict(message.to_string())
        }
        _ => CoreError::Database(err),
    }
}
