use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// JSON envelope every ack and every error response uses.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        // SQLSTATE 23505: unique constraint violation. The only unique key in
        // this schema is users.email.
        let unique_violation = e
            .as_database_error()
            .and_then(|d| d.code())
            .map(|c| c == "23505")
            .unwrap_or(false);
        if unique_violation {
            ApiError::Conflict("Email already registered".into())
        } else {
            ApiError::Persistence(e.into())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(m) | ApiError::Conflict(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Auth(m) => (StatusCode::UNAUTHORIZED, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Persistence(e) => {
                error!(error = %e, "persistence failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error: unable to complete the request. Please try again later."
                        .to_string(),
                )
            }
        };
        (
            status,
            Json(ApiMessage {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (ApiError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (ApiError::Conflict("dup".into()), StatusCode::BAD_REQUEST),
            (ApiError::Auth("nope".into()), StatusCode::UNAUTHORIZED),
            (ApiError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (
                ApiError::Persistence(anyhow::anyhow!("disk on fire")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn persistence_hides_internal_detail() {
        let response = ApiError::Persistence(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn envelope_serializes_success_flag() {
        let json = serde_json::to_string(&ApiMessage::ok("done")).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("done"));
    }
}
