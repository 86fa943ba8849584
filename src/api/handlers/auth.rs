use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::auth::SessionCookie;
use crate::api::response::{ApiError, AppJson, Success};
use crate::session::{expired_session_cookie, session_cookie, SessionError};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub is_admin: bool,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let password = req.password.unwrap_or_default();

    let id = state.sessions.login(&password).await.map_err(|e| match e {
        SessionError::InvalidCredential => {
            tracing::info!("Rejected admin login");
            ApiError::forbidden("Invalid password")
        }
        other @ SessionError::Rng => ApiError::internal(other.to_string()),
    })?;

    tracing::info!("Admin signed in");
    let cookie = session_cookie(&id, state.sessions.ttl());
    Ok(([(header::SET_COOKIE, cookie)], Success::ok()).into_response())
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    SessionCookie(id): SessionCookie,
) -> Response {
    if let Some(id) = id {
        state.sessions.logout(&id).await;
    }
    ([(header::SET_COOKIE, expired_session_cookie())], Success::ok()).into_response()
}

pub async fn session_status(
    State(state): State<Arc<AppState>>,
    SessionCookie(id): SessionCookie,
) -> Json<SessionStatus> {
    let is_admin = match id {
        Some(id) => state.sessions.is_admin(&id).await,
        None => false,
    };
    Json(SessionStatus { is_admin })
}
