//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific area of the app.

pub mod library;
pub mod sheet_session;
pub mod tabs;

// Re-export main types
pub use library::{LibraryError, SheetLibrary};
pub use sheet_session::{DigimonSession, EditOutcome, SessionError, SheetSession, TamerSession};
pub use tabs::{OpenSheet, TabError, TabManager};
