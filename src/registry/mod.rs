pub mod bootstrap;
pub mod models;
pub mod page;
mod store;

pub use models::{Category, Registry, Subject, UnknownCategory};
pub use store::{Listing, NewSubject, SubjectRegistry};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Subjects document is unreadable: {0}")]
    Corrupt(serde_json::Error),
    #[error("Failed to encode subjects document: {0}")]
    Encode(serde_json::Error),
    #[error("Subject already exists: {filename} in {category}")]
    DuplicateSubject { category: Category, filename: String },
    #[error("Subject not found: {filename} in {category}")]
    NotFound { category: Category, filename: String },
    #[error("Invalid subject: {0}")]
    Invalid(String),
}
