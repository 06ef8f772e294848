//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - Saved sheet storage (could swap files -> browser storage or SQLite)
//! - Clock (for testing)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

// =============================================================================
// Sheet Storage
// =============================================================================

/// Flat string key/value storage for saved sheets.
///
/// Values are serialized sheet documents. The store does not interpret them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Every key currently stored, in no particular order.
    async fn list_keys(&self) -> Result<Vec<String>, StorageError>;
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
