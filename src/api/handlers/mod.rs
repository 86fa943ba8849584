mod admin;
mod auth;
mod events;
mod pdfs;
mod static_files;
mod subjects;

use crate::api::response::ApiError;
use crate::pdf_store::PdfStoreError;
use crate::registry::RegistryError;

pub use admin::health;
pub use auth::{login, logout, session_status};
pub use events::event_stream;
pub use pdfs::{delete_pdf, list_pdfs, upload_pdf};
pub use static_files::serve_pdf;
pub use subjects::{add_subject, delete_subject, list_subjects};

/// Map a PdfStoreError to an ApiError
fn pdf_error(e: PdfStoreError) -> ApiError {
    match e {
        PdfStoreError::NotFound(_) => ApiError::not_found("Not found"),
        PdfStoreError::InvalidName(name) => {
            ApiError::bad_request(format!("Invalid file name: {name:?}"))
        }
        other @ PdfStoreError::Io(_) => ApiError::internal(other.to_string()),
    }
}

/// Map a RegistryError to an ApiError
fn registry_error(e: RegistryError) -> ApiError {
    match e {
        // Duplicates are reported as 400 to match what existing clients expect.
        RegistryError::DuplicateSubject { .. } => ApiError::bad_request("Subject already exists"),
        RegistryError::NotFound { .. } => ApiError::not_found("Subject not found"),
        RegistryError::Invalid(message) => ApiError::bad_request(message),
        other @ (RegistryError::Io(_) | RegistryError::Corrupt(_) | RegistryError::Encode(_)) => {
            ApiError::internal(other.to_string())
        }
    }
}
