use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::pdf_error;
use crate::api::auth::AdminSession;
use crate::api::response::{ApiError, AppJson, AppQuery, Empty, SearchParams, Success};
use crate::pdf_store::PdfAsset;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file: PdfAsset,
}

#[derive(Debug, Deserialize)]
pub struct DeletePdfRequest {
    #[serde(default)]
    pub filename: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_pdfs(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<SearchParams>,
) -> Result<Json<Vec<PdfAsset>>, ApiError> {
    let assets = state.pdfs.list(params.needle()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to read pdfs directory");
        ApiError::internal("Failed to read pdfs directory")
    })?;
    Ok(Json(assets))
}

pub async fn upload_pdf(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    mut multipart: Multipart,
) -> Result<Json<Success<UploadResponse>>, ApiError> {
    let mut file_data: Option<Bytes> = None;
    let mut file_name: Option<String> = None;
    let mut name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(multipart_error)?;

                if data.len() as u64 > state.config.max_upload_size {
                    return Err(ApiError::payload_too_large(format!(
                        "File exceeds maximum upload size of {} bytes",
                        state.config.max_upload_size
                    )));
                }
                file_data = Some(data);
            }
            "name" => {
                name = Some(
                    field
                        .text()
                        .await
                        .map_err(multipart_error)?,
                );
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let file_data = file_data.ok_or_else(|| ApiError::bad_request("Missing file"))?;

    // An explicit name wins over the uploaded part's own filename.
    let requested = name
        .filter(|n| !n.trim().is_empty())
        .or(file_name)
        .ok_or_else(|| ApiError::bad_request("Missing file name"))?;

    let asset = state
        .pdfs
        .upload(file_data, &requested)
        .await
        .map_err(pdf_error)?;

    Ok(Success::with(UploadResponse { file: asset }))
}

pub async fn delete_pdf(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    AppJson(req): AppJson<DeletePdfRequest>,
) -> Result<Json<Success<Empty>>, ApiError> {
    let filename = req
        .filename
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing filename"))?;

    state.pdfs.delete(&filename).await.map_err(pdf_error)?;
    Ok(Success::ok())
}

/// Oversized bodies surface here as read errors; keep their 413.
fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(format!("Upload too large: {}", e.body_text()))
    } else {
        ApiError::bad_request(format!("Invalid multipart data: {}", e.body_text()))
    }
}
