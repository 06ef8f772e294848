//! Saved sheet library errors.

use digisheet_domain::{DocumentError, DomainError};

use crate::infrastructure::ports::StorageError;
use crate::use_cases::sheet_session::SessionError;
use crate::use_cases::tabs::TabError;

/// Errors that can occur while saving, listing, or opening saved sheets.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Saved sheet not found: {0}")]
    NotFound(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Tab error: {0}")]
    Tab(#[from] TabError),

    #[error("Sheet error: {0}")]
    Session(#[from] SessionError),
}

impl From<serde_json::Error> for LibraryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Document(DocumentError::Json(e))
    }
}
