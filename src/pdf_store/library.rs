use std::sync::Arc;

use bytes::Bytes;

use super::{sanitize_file_name, PdfAsset, PdfStore, PdfStoreError};
use crate::notify::{NotificationBus, ServerEvent};

/// The File Store as the rest of the service sees it: name sanitization in
/// front of a [`PdfStore`] backend, and one bus event after each successful
/// write.
#[derive(Clone)]
pub struct PdfLibrary {
    store: Arc<dyn PdfStore>,
    bus: NotificationBus,
}

impl PdfLibrary {
    pub fn new(store: Arc<dyn PdfStore>, bus: NotificationBus) -> Self {
        Self { store, bus }
    }

    /// Store `data` under the sanitized form of `requested_name`, replacing any
    /// existing file of that name.
    pub async fn upload(
        &self,
        data: Bytes,
        requested_name: &str,
    ) -> Result<PdfAsset, PdfStoreError> {
        let name = sanitize_file_name(requested_name)?;
        let asset = self.store.put(&name, data).await?;

        tracing::info!(name = %asset.name, "Stored PDF");
        self.bus.publish(ServerEvent::PdfUpdated(asset.clone()));
        Ok(asset)
    }

    /// Delete a PDF, returning the sanitized name that was removed.
    pub async fn delete(&self, requested_name: &str) -> Result<String, PdfStoreError> {
        let name = sanitize_file_name(requested_name)?;
        self.store.delete(&name).await?;

        tracing::info!(name = %name, "Deleted PDF");
        self.bus.publish(ServerEvent::PdfDeleted { name: name.clone() });
        Ok(name)
    }

    /// All stored PDFs, optionally narrowed to names containing `query`
    /// (case-insensitive).
    pub async fn list(&self, query: Option<&str>) -> Result<Vec<PdfAsset>, PdfStoreError> {
        let mut assets = self.store.list().await?;
        if let Some(needle) = query.map(str::to_lowercase).filter(|q| !q.is_empty()) {
            assets.retain(|a| a.name.to_lowercase().contains(&needle));
        }
        Ok(assets)
    }

    /// Read a PDF's bytes for download.
    pub async fn open(&self, requested_name: &str) -> Result<(String, Bytes), PdfStoreError> {
        let name = sanitize_file_name(requested_name)?;
        let data = self.store.get(&name).await?;
        Ok((name, data))
    }
}
