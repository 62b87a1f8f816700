use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sharayeh_core::error::CoreError;
use sharayeh_kernel::api::KernelApiError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `sharayeh_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The Agentic Kernel could not be reached or rejected the call.
    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelApiError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A feature switched off by configuration.
    #[error("Feature disabled: {0}")]
    FeatureDisabled(&'static str),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, key } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} '{key}' not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Kernel errors ---
            AppError::Kernel(err) => classify_kernel_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::FeatureDisabled(feature) => (
                StatusCode::NOT_FOUND,
                "FEATURE_DISABLED",
                format!("{feature} is not enabled"),
            ),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Classify a kernel error. The kernel's own body is logged, never echoed.
///
/// - Transport failures map to 502 `BACKEND_UNAVAILABLE`.
/// - Non-2xx responses map to 502 `BACKEND_ERROR`.
/// - Ids that cannot form a kernel path map to 400.
fn classify_kernel_error(err: &KernelApiError) -> (StatusCode, &'static str, String) {
    match err {
        KernelApiError::Request(e) => {
            tracing::warn!(error = %e, "Kernel unreachable");
            (
                StatusCode::BAD_GATEWAY,
                "BACKEND_UNAVAILABLE",
                "The processing backend is unreachable. Please try again shortly.".to_string(),
            )
        }
        KernelApiError::ApiError { status, body } => {
            tracing::warn!(status, body = %body, "Kernel returned an error");
            (
                StatusCode::BAD_GATEWAY,
                "BACKEND_ERROR",
                format!("The processing backend returned an error ({status})"),
            )
        }
        KernelApiError::InvalidId(id) => (
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            format!("Invalid id: {id:?}"),
        ),
        KernelApiError::InvalidBaseUrl(msg) => {
            tracing::error!(error = %msg, "Kernel base URL misconfigured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
