use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::pdf_store::PdfStoreError;
use crate::AppState;

/// Serve a stored PDF for viewing or download.
/// Route: GET /pdfs/:name
pub async fn serve_pdf(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let (name, data) = state.pdfs.open(&name).await.map_err(|e| match e {
        PdfStoreError::NotFound(_) | PdfStoreError::InvalidName(_) => {
            ApiError::not_found("File not found")
        }
        other => ApiError::internal(format!("Failed to read file: {other}")),
    })?;

    let byte_size = data.len() as u64;
    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();

    let mime = mime_guess::from_path(&name).first_or_octet_stream();
    if let Ok(value) = mime.as_ref().parse() {
        headers.insert(header::CONTENT_TYPE, value);
    }

    headers.insert(header::CONTENT_LENGTH, header::HeaderValue::from(byte_size));

    if let Ok(value) = format!("inline; filename=\"{name}\"").parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    // Re-uploads replace content under the same name, so keep this short.
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("public, max-age=3600"),
    );

    Ok(response)
}
