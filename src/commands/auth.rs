use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::commands::json_body;
use crate::error::{ApiError, AppError};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PassphraseRequest {
    #[serde(default)]
    pub passphrase: Option<String>,
}

/// Plain equality against the configured passphrase. A missing field never matches.
pub fn check_passphrase(expected: &str, supplied: Option<&str>) -> Result<(), AppError> {
    if supplied == Some(expected) {
        Ok(())
    } else {
        Err(AppError::Auth("Invalid passphrase".into()))
    }
}

/// `POST /api/verify-passphrase`. A body that does not parse is treated as a
/// wrong passphrase.
pub async fn verify_passphrase(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PassphraseRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let supplied = json_body(body, StatusCode::UNAUTHORIZED)
        .ok()
        .and_then(|body| body.passphrase);
    match check_passphrase(&state.passphrase, supplied.as_deref()) {
        Ok(()) => Ok(Json(json!({ "success": true }))),
        Err(e) => {
            tracing::warn!("Passphrase verification failed");
            Err(ApiError::from_app(e, "Invalid passphrase"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{state, TEST_PASSPHRASE};
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request};

    async fn json_request(raw: &'static str) -> Result<Json<PassphraseRequest>, JsonRejection> {
        let req = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw))
            .unwrap();
        Json::from_request(req, &()).await
    }

    #[tokio::test]
    async fn test_correct_passphrase() {
        let (state, _) = state(&[]);
        let body = PassphraseRequest {
            passphrase: Some(TEST_PASSPHRASE.into()),
        };
        let Json(resp) = verify_passphrase(State(state), Ok(Json(body))).await.unwrap();
        assert_eq!(resp, json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_wrong_passphrase_is_unauthorized() {
        let (state, _) = state(&[]);
        let body = PassphraseRequest {
            passphrase: Some("open sesame ".into()),
        };
        let err = verify_passphrase(State(state), Ok(Json(body))).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "Invalid passphrase");
    }

    #[tokio::test]
    async fn test_mistyped_passphrase_is_unauthorized() {
        let (state, _) = state(&[]);
        let body = json_request(r#"{"passphrase":42}"#).await;
        assert!(body.is_err());

        let err = verify_passphrase(State(state), body).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "Invalid passphrase");
    }

    #[test]
    fn test_missing_passphrase_never_matches() {
        assert!(check_passphrase("", None).is_err());
        assert!(check_passphrase("", Some("")).is_ok());
    }
}
