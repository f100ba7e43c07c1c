use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// App-wide error type. Every fallible function returns `Result<T, AppError>`.
/// Serializes as `{ error, kind }` so API clients get structured error messages.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Row with ID {0} not found")]
    NotFound(String),

    /// Backing resource (spreadsheet API, CSV file) unreachable or rejected the call.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Conflict(_) => "conflict",
            AppError::NotFound(_) => "not_found",
            AppError::Storage(_) => "storage",
            AppError::Auth(_) => "auth",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

/// We serialize as `{ error: "...", kind: "..." }` for client consumption.
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("AppError", 2)?;
        s.serialize_field("error", &self.to_string())?;
        s.serialize_field("kind", self.kind())?;
        s.end()
    }
}

// =============================================================================
// HTTP mapping
// =============================================================================

/// Error as returned to HTTP clients: a status plus `{ "error": message }`.
///
/// Client-facing failures keep their own message. Storage and internal
/// failures are logged and replaced with the endpoint's fixed message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Map an [`AppError`] to a response, using `fallback` for server-side failures.
    pub fn from_app(err: AppError, fallback: &str) -> Self {
        match err {
            AppError::Validation(msg) | AppError::Conflict(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            AppError::Auth(msg) => Self::new(StatusCode::UNAUTHORIZED, msg),
            other => {
                tracing::error!(kind = other.kind(), error = %other, "{}", fallback);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, fallback)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}
