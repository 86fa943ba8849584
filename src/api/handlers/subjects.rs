use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::registry_error;
use crate::api::auth::AdminSession;
use crate::api::response::{ApiError, AppJson, AppQuery, Empty, SearchParams, Success};
use crate::registry::{Category, NewSubject, Subject};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddSubjectRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub pdf: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddSubjectResponse {
    /// Generated page filename
    pub file: String,
    pub subject: Subject,
}

#[derive(Debug, Deserialize)]
pub struct DeleteSubjectRequest {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Never fails: an unreadable document is served as an empty registry with
/// a `Warning` header.
pub async fn list_subjects(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<SearchParams>,
) -> Response {
    let listing = state.registry.list().await;
    let registry = match params.needle() {
        Some(q) => listing.registry.filtered(q),
        None => listing.registry,
    };

    let mut response = Json(registry).into_response();
    if listing.warning.is_some() {
        response.headers_mut().insert(
            header::WARNING,
            HeaderValue::from_static("199 - \"subjects store unreadable; serving empty registry\""),
        );
    }
    response
}

pub async fn add_subject(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    AppJson(req): AppJson<AddSubjectRequest>,
) -> Result<Json<Success<AddSubjectResponse>>, ApiError> {
    let (Some(title), Some(category)) = (
        req.title.filter(|t| !t.trim().is_empty()),
        req.category.filter(|c| !c.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Missing title or category"));
    };
    let category = parse_category(&category)?;

    let subject = state
        .registry
        .add(NewSubject {
            category,
            title,
            filename: req.filename,
            pdf: req.pdf,
        })
        .await
        .map_err(registry_error)?;

    Ok(Success::with(AddSubjectResponse {
        file: subject.filename.clone(),
        subject,
    }))
}

pub async fn delete_subject(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    AppJson(req): AppJson<DeleteSubjectRequest>,
) -> Result<Json<Success<Empty>>, ApiError> {
    let (Some(filename), Some(category)) = (
        req.filename.filter(|f| !f.is_empty()),
        req.category.filter(|c| !c.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Missing filename or category"));
    };
    let category = parse_category(&category)?;

    state
        .registry
        .remove(category, &filename)
        .await
        .map_err(registry_error)?;

    Ok(Success::ok())
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_category(raw: &str) -> Result<Category, ApiError> {
    raw.parse::<Category>()
        .map_err(|e| ApiError::bad_request(format!("Unknown category: {}", e.0)))
}
