//! Sheet session errors.

use digisheet_domain::DomainError;

/// Errors that can occur while editing an open sheet.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Sheet data must be a JSON object")]
    NotAnObject,

    #[error("Sheet data could not be read: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}
