mod library;
mod local;

pub use library::PdfLibrary;
pub use local::LocalPdfStore;

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF not found: {0}")]
    NotFound(String),
    #[error("Invalid file name: {0:?}")]
    InvalidName(String),
}

/// A stored PDF. Identity is the file name; re-uploading a name replaces the
/// content and bumps `mtime`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfAsset {
    pub name: String,
    pub url: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub mtime: DateTime<Utc>,
}

impl PdfAsset {
    pub fn new(name: impl Into<String>, mtime: DateTime<Utc>) -> Self {
        let name = name.into();
        Self {
            url: format!("/pdfs/{}", urlencoding::encode(&name)),
            name,
            mtime,
        }
    }
}

/// Abstraction over where PDF bytes live.
/// Names passed in are already sanitized basenames.
#[async_trait]
pub trait PdfStore: Send + Sync {
    /// Write (or overwrite) a PDF and return its fresh metadata.
    async fn put(&self, name: &str, data: Bytes) -> Result<PdfAsset, PdfStoreError>;
    async fn get(&self, name: &str) -> Result<Bytes, PdfStoreError>;
    /// Remove a PDF. Missing names are `NotFound`.
    async fn delete(&self, name: &str) -> Result<(), PdfStoreError>;
    /// Every stored PDF, in backend order.
    async fn list(&self) -> Result<Vec<PdfAsset>, PdfStoreError>;
    async fn exists(&self, name: &str) -> Result<bool, PdfStoreError>;
}

/// Reduce a client-supplied name to a safe basename: directory parts are
/// dropped and every character outside `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize_file_name(requested: &str) -> Result<String, PdfStoreError> {
    let base = Path::new(requested)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PdfStoreError::InvalidName(requested.to_string()))?;

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        return Err(PdfStoreError::InvalidName(requested.to_string()));
    }
    Ok(sanitized)
}

pub fn is_pdf(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_disallowed_characters() {
        assert_eq!(sanitize_file_name("a b.pdf").unwrap(), "a_b.pdf");
        assert_eq!(sanitize_file_name("Ünits (v2).pdf").unwrap(), "_nits__v2_.pdf");
        assert_eq!(sanitize_file_name("keep-me_1.0.pdf").unwrap(), "keep-me_1.0.pdf");
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_file_name("dir/notes.pdf").unwrap(), "notes.pdf");
    }

    #[test]
    fn sanitize_rejects_names_without_a_basename() {
        for name in ["", ".", "..", "a/.."] {
            assert!(
                matches!(sanitize_file_name(name), Err(PdfStoreError::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert!(is_pdf("a.pdf"));
        assert!(is_pdf("B.PDF"));
        assert!(!is_pdf("c.pdf.txt"));
        assert!(!is_pdf("pdf"));
    }

    #[test]
    fn url_percent_encodes_the_name() {
        let asset = PdfAsset::new("a b.pdf", Utc::now());
        assert_eq!(asset.url, "/pdfs/a%20b.pdf");
        let asset = PdfAsset::new("a_b.pdf", Utc::now());
        assert_eq!(asset.url, "/pdfs/a_b.pdf");
    }

    #[test]
    fn mtime_serializes_as_epoch_millis() {
        let mtime = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let json = serde_json::to_value(PdfAsset::new("x.pdf", mtime)).unwrap();
        assert_eq!(json["mtime"], 1_700_000_000_123i64);
        assert_eq!(json["name"], "x.pdf");
    }
}
