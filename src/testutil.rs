//! Shared test helpers for in-crate tests.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::{AuthConfig, Config, ServerConfig, StorageConfig};
use crate::notify::NotificationBus;
use crate::pdf_store::{LocalPdfStore, PdfLibrary};
use crate::registry::SubjectRegistry;
use crate::session::SessionStore;
use crate::AppState;

pub const TEST_PASSWORD: &str = "letmein";

/// Create a test AppState rooted in a temporary site directory.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
        },
        storage: StorageConfig::rooted_at(temp_dir.path()),
        auth: AuthConfig {
            admin_password: TEST_PASSWORD.to_string(),
            session_ttl_seconds: 60,
        },
        max_upload_size: 1024 * 1024, // 1MB for tests
        event_buffer: 16,
    };

    let bus = NotificationBus::new(config.event_buffer);
    let store =
        LocalPdfStore::new(&config.storage.pdf_dir).expect("Failed to create test pdf store");
    let pdfs = PdfLibrary::new(Arc::new(store), bus.clone());
    let registry = SubjectRegistry::new(
        &config.storage.site_dir,
        &config.storage.subjects_file,
        bus.clone(),
    );
    let sessions = SessionStore::new(TEST_PASSWORD, config.auth.session_ttl_seconds)
        .expect("Failed to create session store");

    Arc::new(AppState {
        config,
        bus,
        pdfs,
        registry,
        sessions,
        shutdown: CancellationToken::new(),
    })
}
