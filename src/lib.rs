//! subject-portal - study-resource portal backend
//!
//! Students browse subject lists and download PDFs; an administrator signs in
//! and manages both. This crate provides:
//! - A subjects registry kept as one JSON document, with a generated page per subject
//! - A PDF store on the local filesystem
//! - A shared-password admin session guard
//! - A Server-Sent Events feed that pushes every change to connected browsers

pub mod api;
pub mod config;
pub mod notify;
pub mod pdf_store;
pub mod registry;
pub mod session;
#[cfg(test)]
pub mod testutil;

use tokio_util::sync::CancellationToken;

use config::Config;
use notify::NotificationBus;
use pdf_store::PdfLibrary;
use registry::SubjectRegistry;
use session::SessionStore;

/// Shared application state, handed to every handler.
pub struct AppState {
    pub config: Config,
    pub bus: NotificationBus,
    pub pdfs: PdfLibrary,
    pub registry: SubjectRegistry,
    pub sessions: SessionStore,
    /// Cancelled when the server starts shutting down; ends open event streams.
    pub shutdown: CancellationToken,
}
