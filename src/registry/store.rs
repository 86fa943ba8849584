use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::bootstrap::scan_listing_pages;
use super::models::{Category, Registry, Subject};
use super::page::{
    derived_pdf_name, page_filename_from_title, render_subject_page, NOT_FOUND_PAGE, PAGE_EXTENSION,
};
use super::RegistryError;
use crate::notify::{NotificationBus, ServerEvent};
use crate::pdf_store::sanitize_file_name;

/// Input for [`SubjectRegistry::add`].
#[derive(Debug, Clone)]
pub struct NewSubject {
    pub category: Category,
    pub title: String,
    /// Page filename; derived from the title when absent.
    pub filename: Option<String>,
    /// Explicit PDF reference; derived from the page filename when absent.
    pub pdf: Option<String>,
}

/// Result of a read that never fails outright.
#[derive(Debug, Clone)]
pub struct Listing {
    pub registry: Registry,
    /// Set when the stored document could not be read and an empty registry
    /// was substituted.
    pub warning: Option<String>,
}

/// The subjects document plus the generated pages it references.
///
/// Every mutation reads the whole document, changes it, and writes it back.
/// There is no lock: concurrent writers race and the last one wins.
#[derive(Clone)]
pub struct SubjectRegistry {
    site_dir: PathBuf,
    document_path: PathBuf,
    bus: NotificationBus,
}

impl SubjectRegistry {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        site_dir: P,
        document_path: Q,
        bus: NotificationBus,
    ) -> Self {
        Self {
            site_dir: site_dir.as_ref().to_path_buf(),
            document_path: document_path.as_ref().to_path_buf(),
            bus,
        }
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    /// Seed the document from the listing pages if it does not exist yet.
    /// Returns `true` when a bootstrap happened.
    pub async fn ensure_initialized(&self) -> Result<bool, RegistryError> {
        if tokio::fs::try_exists(&self.document_path).await? {
            return Ok(false);
        }
        let registry = self.bootstrap().await;
        self.persist(&registry).await?;
        Ok(true)
    }

    /// Derive a registry from the hand-written listing pages.
    pub async fn bootstrap(&self) -> Registry {
        let registry = scan_listing_pages(&self.site_dir).await;
        tracing::info!(subjects = registry.len(), "Bootstrapped subjects from listing pages");
        registry
    }

    /// Current registry. An unreadable document degrades to an empty
    /// registry with a warning instead of an error.
    pub async fn list(&self) -> Listing {
        match self.load().await {
            Ok(registry) => Listing {
                registry,
                warning: None,
            },
            Err(e) => {
                tracing::warn!(
                    path = %self.document_path.display(),
                    error = %e,
                    "Serving empty subjects registry"
                );
                Listing {
                    registry: Registry::default(),
                    warning: Some(e.to_string()),
                }
            }
        }
    }

    /// Strict read used by mutations so a damaged document is never
    /// overwritten with an empty one.
    pub async fn load(&self) -> Result<Registry, RegistryError> {
        match tokio::fs::read_to_string(&self.document_path).await {
            Ok(text) => serde_json::from_str(&text).map_err(RegistryError::Corrupt),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let registry = self.bootstrap().await;
                if let Err(e) = self.persist(&registry).await {
                    tracing::warn!(error = %e, "Failed to save bootstrapped subjects");
                }
                Ok(registry)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Add a subject, write its page, persist, then notify.
    pub async fn add(&self, new: NewSubject) -> Result<Subject, RegistryError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(RegistryError::Invalid("title must not be empty".to_string()));
        }

        let filename = match new.filename.as_deref().map(str::trim) {
            Some(requested) if !requested.is_empty() => plain_basename(requested)
                .ok_or_else(|| {
                    RegistryError::Invalid(format!("invalid filename '{requested}'"))
                })?
                .to_string(),
            _ => page_filename_from_title(title).ok_or_else(|| {
                RegistryError::Invalid(format!("title '{title}' yields an empty filename"))
            })?,
        };
        self.check_page_name(&filename)?;

        let pdf = match new.pdf.as_deref().map(str::trim) {
            Some(requested) if !requested.is_empty() => sanitize_file_name(requested)
                .map_err(|_| RegistryError::Invalid(format!("invalid pdf name '{requested}'")))?,
            _ => derived_pdf_name(&filename),
        };

        let mut registry = self.load().await?;
        if registry.contains(new.category, &filename) {
            return Err(RegistryError::DuplicateSubject {
                category: new.category,
                filename,
            });
        }

        let page = render_subject_page(title, &pdf);
        tokio::fs::write(self.site_dir.join(&filename), page).await?;

        let subject = Subject {
            title: title.to_string(),
            filename,
            pdf: Some(pdf),
        };
        registry.subjects_mut(new.category).push(subject.clone());
        self.persist(&registry).await?;

        tracing::info!(category = %new.category, filename = %subject.filename, "Added subject");
        self.bus.publish(ServerEvent::SubjectsUpdated(registry));
        Ok(subject)
    }

    /// Remove a subject and, best-effort, its generated page. The PDF it
    /// points at is left alone.
    pub async fn remove(&self, category: Category, filename: &str) -> Result<(), RegistryError> {
        let mut registry = self.load().await?;
        let subjects = registry.subjects_mut(category);
        let index = subjects
            .iter()
            .position(|s| s.filename == filename)
            .ok_or_else(|| RegistryError::NotFound {
                category,
                filename: filename.to_string(),
            })?;

        self.remove_page(filename).await;
        subjects.remove(index);
        self.persist(&registry).await?;

        tracing::info!(category = %category, filename = %filename, "Removed subject");
        self.bus.publish(ServerEvent::SubjectsUpdated(registry));
        Ok(())
    }

    /// Generated pages are `.html` files that must not replace a listing
    /// page, the error page or the document itself.
    fn check_page_name(&self, filename: &str) -> Result<(), RegistryError> {
        let stem_len = filename.len().saturating_sub(PAGE_EXTENSION.len());
        if stem_len == 0 || !filename.ends_with(PAGE_EXTENSION) {
            return Err(RegistryError::Invalid(format!(
                "page '{filename}' must end in {PAGE_EXTENSION}"
            )));
        }

        let reserved = Category::ALL
            .iter()
            .map(|c| c.listing_page())
            .chain([NOT_FOUND_PAGE])
            .any(|page| page.eq_ignore_ascii_case(filename));
        if reserved || self.site_dir.join(filename) == self.document_path {
            return Err(RegistryError::Invalid(format!(
                "page '{filename}' is reserved"
            )));
        }
        Ok(())
    }

    async fn remove_page(&self, filename: &str) {
        let Some(name) = plain_basename(filename) else {
            tracing::warn!(filename = %filename, "Not deleting page outside the site root");
            return;
        };
        match tokio::fs::remove_file(self.site_dir.join(name)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(filename = %filename, error = %e, "Failed to remove subject page");
            }
        }
    }

    /// Replace the whole document: write a sibling temp file, then rename
    /// it over the original.
    async fn persist(&self, registry: &Registry) -> Result<(), RegistryError> {
        let data = serde_json::to_vec_pretty(registry).map_err(RegistryError::Encode)?;

        if let Some(parent) = self.document_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut tmp = self.document_path.clone().into_os_string();
        tmp.push(format!(".{}.tmp", uuid::Uuid::new_v4()));
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &data).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.document_path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

/// `name` itself when it is a single path component, else `None`.
fn plain_basename(name: &str) -> Option<&str> {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|base| *base == name)
}
