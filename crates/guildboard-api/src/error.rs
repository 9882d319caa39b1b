//! API error taxonomy and response formatting.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use guildboard_types::api::ErrorBody;

/// Request-level failures, in the order the gate checks them plus the two
/// downstream classes. Auth variants carry fixed messages so upstream
/// detail never leaks on those paths; `Upstream` may surface the store's
/// message since aggregate reads hold no secrets.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid required parameter. Never silently defaulted
    /// for `guildId`.
    #[error("{0}")]
    BadRequest(String),

    /// No session.
    #[error("Unauthorized")]
    Unauthorized,

    /// Session present, but the guild is not in the principal's admin list.
    #[error("Forbidden")]
    Forbidden,

    /// A backing aggregate call failed on a single-aggregate family.
    #[error("{0}")]
    Upstream(String),

    /// Unexpected failure; the client sees a generic message only.
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn upstream(err: anyhow::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            Self::Upstream(msg) => {
                tracing::error!(error = %msg, "aggregate query failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
