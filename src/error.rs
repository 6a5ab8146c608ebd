//! # Error Handling
//!
//! Storage operations return [`RepositoryError`], which keeps "not found" and
//! "invalid input" apart from driver failures. The REST layer converts it into
//! [`ApiError`], a problem+json response carrying a trace id.

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, RuntimeErr};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::telemetry;

/// Errors returned by repositories and the storage facade.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No row matched the requested id, name, cluster or type.
    #[error("not found: {0}")]
    NotFound(String),
    /// Caller supplied a malformed identifier or value.
    #[error("validation failed: {0}")]
    Validation(String),
    /// A query referenced a column the entity does not define.
    #[error("unknown column '{column}' for table '{table}'")]
    UnknownColumn { table: String, column: String },
    /// Connection, schema or constraint failure reported by the driver.
    #[error("storage error: {0}")]
    Storage(#[from] DbErr),
}

impl RepositoryError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn database_error(error: DbErr) -> Self {
        Self::Storage(error)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Parses a numeric identifier taken from a path segment or query string.
pub fn parse_id(raw: &str) -> Result<i32, RepositoryError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| RepositoryError::validation_error(format!("'{raw}' is not a valid id")))
}

/// Problem+json body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    #[serde(skip_serializing, skip_deserializing)]
    pub status: StatusCode,
    /// Stable machine-readable code such as `NOT_FOUND`
    pub code: Box<str>,
    pub message: Box<str>,
    /// Trace id of the request, or a generated correlation id outside one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Box<str>>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: &str) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            trace_id: Some(Self::trace_id()),
        }
    }

    fn internal(message: &str) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            message,
        )
    }

    fn trace_id() -> Box<str> {
        telemetry::current_trace_id()
            .unwrap_or_else(|| format!("corr-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]))
            .into_boxed_str()
    }
}

/// Duplicate-key failures from either engine. Postgres reports SQLSTATE 23505,
/// SQLite the extended codes for UNIQUE (2067) and PRIMARY KEY (1555).
fn is_unique_violation(error: &DbErr) -> bool {
    let sqlx_err = match error {
        DbErr::Query(RuntimeErr::SqlxError(err)) | DbErr::Exec(RuntimeErr::SqlxError(err)) => err,
        _ => return false,
    };
    let Some(db_error) = sqlx_err.as_database_error() else {
        return false;
    };

    db_error.is_unique_violation()
        || db_error
            .code()
            .is_some_and(|code| matches!(code.as_ref(), "23505" | "2067" | "1555"))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        (self.status, headers, axum::Json(self)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON: {err}"),
            JsonRejection::JsonSyntaxError(err) => format!("JSON syntax error: {err}"),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing 'Content-Type: application/json' header".to_string()
            }
            _ => "Invalid request body".to_string(),
        };
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", &message)
    }
}

impl From<DbErr> for ApiError {
    fn from(error: DbErr) -> Self {
        if is_unique_violation(&error) {
            tracing::debug!(?error, "duplicate key rejected");
            return Self::new(StatusCode::CONFLICT, "CONFLICT", "Resource already exists");
        }

        match error {
            DbErr::RecordNotFound(record) => Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                &format!("Record not found: {record}"),
            ),
            DbErr::Conn(err) => {
                tracing::error!(error = ?err, "database unavailable");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Database service unavailable",
                )
            }
            other => {
                tracing::error!(error = ?other, "database operation failed");
                Self::internal("Database error occurred")
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(message) => {
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", &message)
            }
            RepositoryError::Validation(message) => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", &message)
            }
            RepositoryError::UnknownColumn { table, column } => {
                tracing::error!(%table, %column, "query referenced an unknown column");
                Self::internal("Internal Server Error")
            }
            RepositoryError::Storage(db_err) => db_err.into(),
        }
    }
}
