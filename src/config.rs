use std::path::{Path, PathBuf};

use thiserror::Error;

const DEFAULT_ADMIN_PASSWORD: &str = "admin";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
    /// Buffered events per live-feed subscriber before it starts lagging
    pub event_buffer: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root of the public site: listing pages, generated subject pages, static assets
    pub site_dir: PathBuf,
    /// Directory holding uploaded PDFs
    pub pdf_dir: PathBuf,
    /// The subjects registry document
    pub subjects_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub admin_password: String,
    pub session_ttl_seconds: u64,
}

impl StorageConfig {
    /// Lay out pdfs/ and subjects.json under a site root.
    pub fn rooted_at<P: AsRef<Path>>(site_dir: P) -> Self {
        let site_dir = site_dir.as_ref().to_path_buf();
        Self {
            pdf_dir: site_dir.join("pdfs"),
            subjects_file: site_dir.join("subjects.json"),
            site_dir,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::rooted_at(".")
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            session_ttl_seconds: 8 * 60 * 60,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| {
            let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
            format!("0.0.0.0:{port}")
        });

        let site_dir = std::env::var("SITE_DIR").unwrap_or_else(|_| ".".to_string());
        let mut storage = StorageConfig::rooted_at(&site_dir);
        if let Ok(pdf_dir) = std::env::var("PDF_DIR") {
            storage.pdf_dir = PathBuf::from(pdf_dir);
        }
        if let Ok(subjects_file) = std::env::var("SUBJECTS_FILE") {
            storage.subjects_file = PathBuf::from(subjects_file);
        }

        let admin_password = std::env::var("ADMIN_PASSWORD")
            .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());

        let session_ttl_seconds = std::env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(AuthConfig::default().session_ttl_seconds);

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(50 * 1024 * 1024); // 50MB

        let event_buffer = std::env::var("EVENT_BUFFER")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(64);

        let config = Config {
            server: ServerConfig { bind_address },
            storage,
            auth: AuthConfig {
                admin_password,
                session_ttl_seconds,
            },
            max_upload_size,
            event_buffer,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.admin_password.is_empty() {
            return Err(ConfigError::ValidationError(
                "ADMIN_PASSWORD cannot be empty".to_string(),
            ));
        }

        if self.auth.session_ttl_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "SESSION_TTL_SECONDS must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer == 0 {
            return Err(ConfigError::ValidationError(
                "EVENT_BUFFER must be greater than 0".to_string(),
            ));
        }

        if self.auth.admin_password == DEFAULT_ADMIN_PASSWORD {
            tracing::warn!("ADMIN_PASSWORD is not set; using the built-in default password");
        }

        Ok(())
    }
}
