//! The skill endpoint.

use crate::AppState;
use atomic_skill::handlers;
use atomic_types::{RequestEnvelope, ResponseEnvelope};
use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Handler for `POST /`.
///
/// Decodes the platform envelope, dispatches it, and echoes the updated
/// session attributes back. Requests no handler accepts are answered with the
/// apology, the same as a faulting handler.
pub async fn skill_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<RequestEnvelope>, JsonRejection>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let Json(envelope) = payload?;
    let session_id = envelope.session_id().unwrap_or("-").to_string();
    let (event, mut session) = envelope.into_parts();

    let span = tracing::info_span!(
        "skill_request",
        request_type = %event.kind,
        intent = event.intent_name().unwrap_or("-"),
        request_id = event.request_id.as_deref().unwrap_or("-"),
        session_id = %session_id,
    );

    let result = span.in_scope(|| match state.dispatcher.dispatch(&event, &mut session) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("answering with apology: {}", e);
            handlers::apology()
        }
    });

    Ok(Json(ResponseEnvelope::new(&result, session)))
}
