//! Saved sheet library use cases.
//!
//! Saved sheets live in a flat key/value store under `digi2e:{title}` keys.
//! Entries that no longer parse are removed whenever the library walks the
//! store, so one corrupt save never blocks listing the others.

mod error;

pub use error::LibraryError;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use digisheet_domain::{DocumentError, DomainError, SheetDocument, SheetKind, TabId};

use crate::infrastructure::ports::{ClockPort, SheetStore};
use crate::use_cases::tabs::{TabError, TabManager};

/// Prefix every saved sheet key carries.
pub const STORAGE_PREFIX: &str = "digi2e:";

/// Title given to saves that have none.
const UNTITLED_SAVE: &str = "New Sheet";

pub fn storage_key(title: &str) -> String {
    format!("{}{}", STORAGE_PREFIX, title)
}

// =============================================================================
// Result Types
// =============================================================================

/// One entry of the saved sheet list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSheet {
    pub key: String,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: SheetKind,
    pub saved_date: Option<DateTime<Utc>>,
}

impl SavedSheet {
    fn from_document(key: impl Into<String>, document: &SheetDocument) -> Self {
        Self {
            key: key.into(),
            title: document.title.clone(),
            kind: document.kind,
            saved_date: document.saved_date,
        }
    }
}

// =============================================================================
// Use Cases
// =============================================================================

/// Container for saved sheet use cases.
pub struct SheetLibrary {
    store: Arc<dyn SheetStore>,
    clock: Arc<dyn ClockPort>,
}

impl SheetLibrary {
    pub fn new(store: Arc<dyn SheetStore>, clock: Arc<dyn ClockPort>) -> Self {
        Self { store, clock }
    }

    /// Saves a tab under `title` and renames the tab to match.
    ///
    /// Other saves with the same title are replaced, and corrupt saves found
    /// along the way are removed.
    pub async fn save(
        &self,
        tabs: &mut TabManager,
        id: TabId,
        title: &str,
    ) -> Result<SavedSheet, LibraryError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("Please enter a valid name").into());
        }

        let tab = tabs.get(id).ok_or(TabError::NotFound(id))?;
        let document = SheetDocument::saved(
            id,
            tab.kind(),
            title,
            tab.sheet().to_data()?,
            self.clock.now(),
        );
        let key = storage_key(title);

        for existing in self.saved_keys().await? {
            if existing == key {
                continue;
            }
            let Some(raw) = self.store.get(&existing).await? else {
                continue;
            };
            match serde_json::from_str::<Value>(&raw) {
                Ok(value) => {
                    if value.get("title").and_then(Value::as_str) == Some(title) {
                        self.store.remove(&existing).await?;
                        tracing::debug!(key = %existing, "Replaced save with the same title");
                    }
                }
                Err(e) => {
                    tracing::warn!(key = %existing, error = %e, "Removing corrupt saved sheet");
                    self.store.remove(&existing).await?;
                }
            }
        }

        self.store
            .put(&key, &serde_json::to_string(&document)?)
            .await?;
        tabs.update_title(id, title)?;

        tracing::info!(tab_id = %id, key = %key, kind = %document.kind, "Saved sheet");

        Ok(SavedSheet::from_document(key, &document))
    }

    /// Every readable save, sorted by key.
    pub async fn list(&self) -> Result<Vec<SavedSheet>, LibraryError> {
        let mut saves = Vec::new();
        for key in self.saved_keys().await? {
            let Some(raw) = self.store.get(&key).await? else {
                continue;
            };
            if raw.trim().is_empty() || raw.trim() == "null" {
                self.store.remove(&key).await?;
                continue;
            }
            match SheetDocument::from_json_str(&raw) {
                Ok(document) => saves.push(SavedSheet::from_document(&*key, &document)),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Removing corrupt saved sheet");
                    self.store.remove(&key).await?;
                }
            }
        }
        Ok(saves)
    }

    /// Opens a save in a new tab.
    ///
    /// Missing pieces default: title "New Sheet", type digimon, empty data.
    pub async fn open(&self, tabs: &mut TabManager, key: &str) -> Result<TabId, LibraryError> {
        let raw = self
            .store
            .get(key)
            .await?
            .ok_or_else(|| LibraryError::NotFound(key.to_string()))?;
        let value: Value = serde_json::from_str(&raw)?;

        let title = value
            .get("title")
            .and_then(Value::as_str)
            .filter(|title| !title.is_empty())
            .unwrap_or(UNTITLED_SAVE);
        let kind = match value.get("type").and_then(Value::as_str) {
            None | Some("") => SheetKind::Digimon,
            Some(kind) => kind
                .parse()
                .map_err(|_| DocumentError::UnsupportedType(kind.to_string()))?,
        };
        let data = value
            .get("data")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_else(Map::new);

        let id = tabs.add_tab(title, kind, Some(&data))?;
        tracing::info!(tab_id = %id, key = %key, "Opened saved sheet");
        Ok(id)
    }

    pub async fn delete(&self, key: &str) -> Result<(), LibraryError> {
        self.store.remove(key).await?;
        tracing::info!(key = %key, "Deleted saved sheet");
        Ok(())
    }

    async fn saved_keys(&self) -> Result<Vec<String>, LibraryError> {
        let mut keys: Vec<String> = self
            .store
            .list_keys()
            .await?
            .into_iter()
            .filter(|key| key.starts_with(STORAGE_PREFIX))
            .collect();
        keys.sort();
        Ok(keys)
    }
}
