use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ApiResponse;

/// PostgreSQL unique_violation
const PG_UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL foreign_key_violation
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";
/// PostgreSQL string_data_right_truncation
const PG_STRING_TOO_LONG: &str = "22001";
/// PostgreSQL numeric_value_out_of_range
const PG_NUMERIC_OUT_OF_RANGE: &str = "22003";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message shown to API clients and in admin page notices
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Storage(_) => "Failed to store image".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg) => msg.clone(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Convert a database error into a more specific AppError.
///
/// Unique and foreign-key violations become conflicts carrying `conflict_message`;
/// values the columns cannot hold become validation errors; everything else
/// stays a database error.
pub fn handle_db_error(e: sqlx::Error, conflict_message: &str) -> AppError {
    convert_db_error(e, conflict_message, None)
}

/// Like `handle_db_error`, for writes on the referencing side of a foreign key.
///
/// A foreign-key violation there means a referenced row is gone, so it becomes
/// a not-found error carrying `missing_message`.
pub fn handle_reference_error(e: sqlx::Error, missing_message: &str) -> AppError {
    convert_db_error(e, missing_message, Some(missing_message))
}

fn convert_db_error(
    e: sqlx::Error,
    conflict_message: &str,
    missing_message: Option<&str>,
) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if let Some(mapped) = db_err
            .code()
            .and_then(|code| map_pg_code(&code, conflict_message, missing_message))
        {
            return mapped;
        }
    }

    tracing::error!("Database error: {:?}", e);
    AppError::Database(e)
}

fn map_pg_code(
    code: &str,
    conflict_message: &str,
    missing_message: Option<&str>,
) -> Option<AppError> {
    match code {
        PG_FOREIGN_KEY_VIOLATION => Some(match missing_message {
            Some(msg) => AppError::NotFound(msg.to_string()),
            None => AppError::Conflict(conflict_message.to_string()),
        }),
        PG_UNIQUE_VIOLATION => Some(AppError::Conflict(conflict_message.to_string())),
        PG_STRING_TOO_LONG => Some(AppError::Validation("Value is too long".to_string())),
        PG_NUMERIC_OUT_OF_RANGE => Some(AppError::Validation(
            "Numeric value is out of range".to_string(),
        )),
        _ => None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Storage(msg) => tracing::error!("Storage error: {}", msg),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            _ => {}
        }

        let status = self.status_code();
        let message = self.public_message();
        let errors = match self {
            AppError::Validation(ref msg) => Some(vec![msg.clone()]),
            _ => None,
        };

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
