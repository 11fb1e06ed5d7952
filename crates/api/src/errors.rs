use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use formgate_auth::AuthError;

/// Failures a handler cannot turn into a redirect.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        match self {
            ApiError::Auth(e) if e.is_credential_failure() => {
                json_error(StatusCode::UNAUTHORIZED, "unauthorized", e.public_message())
            }
            ApiError::Auth(AuthError::AccessDenied) => {
                json_error(StatusCode::FORBIDDEN, "forbidden", "access denied")
            }
            ApiError::Auth(e) => {
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "auth_error", e.public_message())
            }
            ApiError::Session(_) => json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "session_error",
                "session store unavailable",
            ),
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
