//! HTTP handlers. Each takes the shared [`AppState`](crate::AppState),
//! delegates to `db::repos` / `engine`, and maps failures through
//! [`ApiError`](crate::error::ApiError).

pub mod auth;
pub mod scoreboard;
pub mod system;
pub mod wheel;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::error::ApiError;

/// Unwrap a JSON body, turning a malformed or mistyped payload into
/// `status` with the usual `{ "error": ... }` shape.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>, status: StatusCode) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            let detail = rejection.body_text();
            tracing::debug!(error = %detail, "Rejected request body");
            Err(ApiError::new(status, detail))
        }
    }
}

/// Render a loosely-typed JSON field as the string stored in the roster.
/// `null` counts as absent.
pub(crate) fn stringify_field(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
