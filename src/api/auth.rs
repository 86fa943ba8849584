use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use super::response::ApiError;
use crate::session::{cookie_value, SESSION_COOKIE};
use crate::AppState;

/// The session id from the request's cookie, if any.
pub struct SessionCookie(pub Option<String>);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SessionCookie {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|h| cookie_value(h, SESSION_COOKIE))
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Ok(SessionCookie(id))
    }
}

/// Gate for mutating endpoints. Put it before any body extractor so a
/// missing session is reported as 401 whatever the body looks like.
pub struct AdminSession;

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        let SessionCookie(id) = SessionCookie::from_request_parts(parts, state)
            .await
            .unwrap_or(SessionCookie(None));

        match id {
            Some(id) if state.sessions.is_admin(&id).await => Ok(AdminSession),
            _ => Err(ApiError::unauthorized()),
        }
    }
}
