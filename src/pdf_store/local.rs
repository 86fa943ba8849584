use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{is_pdf, PdfAsset, PdfStore, PdfStoreError};

/// PDFs kept as plain files in one directory.
pub struct LocalPdfStore {
    base_path: PathBuf,
}

impl LocalPdfStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn pdf_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    async fn asset_for(&self, name: &str) -> Result<PdfAsset, PdfStoreError> {
        let meta = tokio::fs::metadata(self.pdf_path(name)).await?;
        let mtime: DateTime<Utc> = meta.modified()?.into();
        Ok(PdfAsset::new(name, mtime))
    }
}

fn not_found_as(name: &str) -> impl FnOnce(std::io::Error) -> PdfStoreError + '_ {
    move |e| match e.kind() {
        ErrorKind::NotFound => PdfStoreError::NotFound(name.to_string()),
        _ => PdfStoreError::Io(e),
    }
}

#[async_trait]
impl PdfStore for LocalPdfStore {
    async fn put(&self, name: &str, data: Bytes) -> Result<PdfAsset, PdfStoreError> {
        tokio::fs::write(self.pdf_path(name), &data).await?;
        self.asset_for(name).await
    }

    async fn get(&self, name: &str) -> Result<Bytes, PdfStoreError> {
        let data = tokio::fs::read(self.pdf_path(name))
            .await
            .map_err(not_found_as(name))?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, name: &str) -> Result<(), PdfStoreError> {
        tokio::fs::remove_file(self.pdf_path(name))
            .await
            .map_err(not_found_as(name))
    }

    async fn list(&self) -> Result<Vec<PdfAsset>, PdfStoreError> {
        let mut entries = tokio::fs::read_dir(&self.base_path).await?;
        let mut assets = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !is_pdf(&name) {
                continue;
            }
            let meta = match entry.metadata().await {
                Ok(meta) if meta.is_file() => meta,
                Ok(_) => continue,
                // Removed between read_dir and stat.
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            assets.push(PdfAsset::new(name, meta.modified()?.into()));
        }

        Ok(assets)
    }

    async fn exists(&self, name: &str) -> Result<bool, PdfStoreError> {
        Ok(tokio::fs::try_exists(self.pdf_path(name)).await?)
    }
}
