//! Tab host errors.

use digisheet_domain::{DocumentError, TabId};

use crate::use_cases::sheet_session::SessionError;

/// Errors that can occur while managing open tabs.
#[derive(Debug, thiserror::Error)]
pub enum TabError {
    #[error("Tab not found: {0}")]
    NotFound(TabId),

    #[error("Sheet error: {0}")]
    Session(#[from] SessionError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
}
