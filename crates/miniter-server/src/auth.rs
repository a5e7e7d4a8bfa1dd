//! Session authentication for protected routes.
//!
//! The token travels raw in the `Authorization` header; a `Bearer ` prefix is
//! tolerated. Identity always comes from the verified token, never from
//! request bodies.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use miniter_shared::{SessionError, UserId};

use crate::api::AppState;
use crate::error::ServerError;

/// The user id carried by a valid session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or(SessionError::Missing)?;
        let user_id = state.sessions.validate(token)?;
        Ok(AuthUser(user_id))
    }
}

fn session_token(parts: &Parts) -> Option<&str> {
    let raw = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/timeline");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_raw_token() {
        let parts = parts_with(Some("abc.def.ghi"));
        assert_eq!(session_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_prefix_tolerated() {
        let parts = parts_with(Some("Bearer abc.def.ghi"));
        assert_eq!(session_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_or_empty() {
        assert_eq!(session_token(&parts_with(None)), None);
        assert_eq!(session_token(&parts_with(Some(""))), None);
        assert_eq!(session_token(&parts_with(Some("Bearer "))), None);
    }
}
