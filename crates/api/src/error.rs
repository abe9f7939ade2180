//! HTTP error mapping.
//!
//! Every handler failure leaves the server as `{"error": ..., "code": ...}`.
//! Storage errors are logged in full and reach the client only as a
//! generic message, except for the constraint violations listed below.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use safewalk_core::error::CoreError;
use serde::Serialize;

/// PostgreSQL `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL `check_violation`.
const PG_CHECK_VIOLATION: &str = "23514";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(errors.into())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

type Mapped = (StatusCode, &'static str, String);

fn internal() -> Mapped {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = match &self {
            AppError::Core(core) => map_core_error(core),
            AppError::Database(err) => map_sqlx_error(err),
        };
        (status, Json(ErrorBody { error, code })).into_response()
    }
}

fn map_core_error(err: &CoreError) -> Mapped {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Map a sqlx error onto the response triple.
///
/// `RowNotFound` is a 404. Violations of the `uq_users_*` identity indexes
/// are 409s and `ck_*` check constraints are 400s. Anything else is a 500.
fn map_sqlx_error(err: &sqlx::Error) -> Mapped {
    let db_err = match err {
        sqlx::Error::RowNotFound => {
            return (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            )
        }
        sqlx::Error::Database(db_err) => db_err,
        other => {
            tracing::error!(error = %other, "Database error");
            return internal();
        }
    };

    let constraint = db_err.constraint().unwrap_or_default();
    match db_err.code().as_deref() {
        Some(PG_UNIQUE_VIOLATION) if constraint.starts_with("uq_") => (
            StatusCode::CONFLICT,
            "CONFLICT",
            duplicate_identity_message(constraint),
        ),
        Some(PG_CHECK_VIOLATION) if constraint.starts_with("ck_") => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Value rejected by constraint {constraint}"),
        ),
        _ => {
            tracing::error!(error = %db_err, constraint, "Database error");
            internal()
        }
    }
}

/// Client-facing message for a unique index violation.
fn duplicate_identity_message(constraint: &str) -> String {
    match constraint {
        "uq_users_email" => "An account with this email already exists".to_string(),
        "uq_users_phone" => "An account with this phone number already exists".to_string(),
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}
