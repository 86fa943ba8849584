use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::registry::page::NOT_FOUND_PAGE;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize;
    let site_dir = state.config.storage.site_dir.clone();
    let site = ServeDir::new(&site_dir)
        .not_found_service(ServeFile::new(site_dir.join(NOT_FOUND_PAGE)));

    Router::new()
        // PDFs
        .route("/api/pdfs", get(handlers::list_pdfs))
        .route(
            "/api/upload",
            post(handlers::upload_pdf).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/pdfs/delete", post(handlers::delete_pdf))
        // Subjects
        .route("/api/subjects", get(handlers::list_subjects))
        .route("/api/subjects/add", post(handlers::add_subject))
        .route("/api/subjects/delete", post(handlers::delete_subject))
        // Session
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/api/session", get(handlers::session_status))
        // Live feed
        .route("/api/events", get(handlers::event_stream))
        // PDF download
        .route("/pdfs/:name", get(handlers::serve_pdf))
        // Internal
        .route("/_internal/health", get(handlers::health))
        // Listing pages, generated subject pages, client scripts
        .fallback_service(site)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
