use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use miniter_shared::{SessionError, UserId};
use miniter_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Any credential failure. Deliberately carries no detail so that an
    /// unknown account and a wrong password look the same to the client.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Tweet too long: {chars} characters (max {max})")]
    TweetTooLong { chars: usize, max: usize },

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large (max {max} bytes)")]
    PayloadTooLarge { max: usize },

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(_) => ServerError::DuplicateEmail,
            StoreError::UserNotFound(id) => ServerError::UserNotFound(id),
            StoreError::TweetTooLong { chars, max } => ServerError::TweetTooLong { chars, max },
            other => ServerError::Storage(other.to_string()),
        }
    }
}

impl From<SessionError> for ServerError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Signing(e) => ServerError::Internal(e),
            other => {
                tracing::debug!(reason = %other, "rejected session token");
                ServerError::Unauthorized
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ServerError::DuplicateEmail
            | ServerError::TweetTooLong { .. }
            | ServerError::UserNotFound(_)
            | ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::PayloadTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }
            ServerError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            ServerError::Internal(e) => {
                tracing::error!(error = %e, "internal failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_client_errors() {
        let cases = [
            (StoreError::DuplicateEmail("a@b.c".into()), StatusCode::BAD_REQUEST),
            (StoreError::UserNotFound(UserId(3)), StatusCode::BAD_REQUEST),
            (
                StoreError::TweetTooLong { chars: 301, max: 300 },
                StatusCode::BAD_REQUEST,
            ),
            (
                StoreError::Migration("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let resp = ServerError::from(err).into_response();
            assert_eq!(resp.status(), expected);
        }
    }

    #[test]
    fn test_session_errors_are_unauthorized() {
        for err in [
            SessionError::Missing,
            SessionError::Expired,
            SessionError::Invalid("bad sig".into()),
        ] {
            let resp = ServerError::from(err).into_response();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
