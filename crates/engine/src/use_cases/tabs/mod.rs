//! Tab host use cases.
//!
//! Holds every open sheet. Each tab owns its own session; tabs never share a
//! model, and closing a tab drops its model.

mod error;

pub use error::TabError;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use digisheet_domain::document::IMPORTED_TITLE;
use digisheet_domain::{
    BundleImport, BundleSheet, ComputedValues, DigimonEngine, DigimonSheet, HealthBar,
    SheetBundle, SheetDocument, SheetKind, TabId, TamerEngine, TamerSheet,
};

use crate::use_cases::sheet_session::{DigimonSession, SessionError, SheetSession, TamerSession};

// =============================================================================
// Open sheets
// =============================================================================

/// A session of either archetype.
#[derive(Debug, Clone)]
pub enum OpenSheet {
    Digimon(DigimonSession),
    Tamer(TamerSession),
}

/// Kind-independent view of a sheet after an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetUpdate {
    pub outputs: ComputedValues,
    pub health: HealthBar,
}

impl OpenSheet {
    pub fn new(kind: SheetKind) -> Self {
        match kind {
            SheetKind::Digimon => {
                OpenSheet::Digimon(SheetSession::new(DigimonEngine::new(), DigimonSheet::new()))
            }
            SheetKind::Tamer => {
                OpenSheet::Tamer(SheetSession::new(TamerEngine::new(), TamerSheet::new()))
            }
        }
    }

    pub fn from_data(kind: SheetKind, data: &Map<String, Value>) -> Result<Self, SessionError> {
        Ok(match kind {
            SheetKind::Digimon => {
                OpenSheet::Digimon(SheetSession::from_data(DigimonEngine::new(), data)?)
            }
            SheetKind::Tamer => OpenSheet::Tamer(SheetSession::from_data(TamerEngine::new(), data)?),
        })
    }

    pub fn kind(&self) -> SheetKind {
        match self {
            OpenSheet::Digimon(_) => SheetKind::Digimon,
            OpenSheet::Tamer(_) => SheetKind::Tamer,
        }
    }

    pub fn outputs(&self) -> &ComputedValues {
        match self {
            OpenSheet::Digimon(session) => session.outputs(),
            OpenSheet::Tamer(session) => session.outputs(),
        }
    }

    pub fn health(&self) -> HealthBar {
        match self {
            OpenSheet::Digimon(session) => session.health(),
            OpenSheet::Tamer(session) => session.health(),
        }
    }

    pub fn to_data(&self) -> Result<Map<String, Value>, SessionError> {
        match self {
            OpenSheet::Digimon(session) => session.to_data(),
            OpenSheet::Tamer(session) => session.to_data(),
        }
    }

    /// Applies raw input at a dotted field path.
    pub fn apply_edit(&mut self, path: &str, raw: &str) -> Result<SheetUpdate, SessionError> {
        let (outputs, health) = match self {
            OpenSheet::Digimon(session) => {
                let outcome = session.apply_edit(path, raw)?;
                (outcome.outputs, outcome.health)
            }
            OpenSheet::Tamer(session) => {
                let outcome = session.apply_edit(path, raw)?;
                (outcome.outputs, outcome.health)
            }
        };
        Ok(SheetUpdate { outputs, health })
    }

    pub fn as_digimon_mut(&mut self) -> Option<&mut DigimonSession> {
        match self {
            OpenSheet::Digimon(session) => Some(session),
            OpenSheet::Tamer(_) => None,
        }
    }

    pub fn as_tamer_mut(&mut self) -> Option<&mut TamerSession> {
        match self {
            OpenSheet::Tamer(session) => Some(session),
            OpenSheet::Digimon(_) => None,
        }
    }
}

// =============================================================================
// Tabs
// =============================================================================

#[derive(Debug, Clone)]
pub struct Tab {
    id: TabId,
    title: String,
    sheet: OpenSheet,
}

impl Tab {
    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> SheetKind {
        self.sheet.kind()
    }

    pub fn sheet(&self) -> &OpenSheet {
        &self.sheet
    }

    pub fn sheet_mut(&mut self) -> &mut OpenSheet {
        &mut self.sheet
    }

    pub fn summary(&self) -> TabSummary {
        TabSummary {
            id: self.id,
            title: self.title.clone(),
            kind: self.kind(),
        }
    }

    fn bundle_sheet(&self) -> Result<BundleSheet, SessionError> {
        Ok(BundleSheet {
            id: self.id.to_string(),
            title: self.title.clone(),
            kind: self.kind(),
            data: self.sheet.to_data()?,
        })
    }
}

/// Snapshot of a tab's identity, detached from its sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabSummary {
    pub id: TabId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: SheetKind,
}

/// All open tabs and which one is active.
#[derive(Debug, Default)]
pub struct TabManager {
    tabs: Vec<Tab>,
    active: Option<TabId>,
}

impl TabManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a sheet in a new tab and activates it.
    ///
    /// `data` is a document's raw model; without it the sheet starts from
    /// defaults.
    pub fn add_tab(
        &mut self,
        title: impl Into<String>,
        kind: SheetKind,
        data: Option<&Map<String, Value>>,
    ) -> Result<TabId, TabError> {
        let sheet = match data {
            Some(data) => OpenSheet::from_data(kind, data)?,
            None => OpenSheet::new(kind),
        };
        let id = TabId::new();
        let title = title.into();

        tracing::info!(tab_id = %id, kind = %kind, title = %title, "Opened tab");

        self.tabs.push(Tab { id, title, sheet });
        self.active = Some(id);
        Ok(id)
    }

    /// Opens a validated document. Untitled documents get "Imported Sheet".
    pub fn add_document(&mut self, document: &SheetDocument) -> Result<TabId, TabError> {
        self.add_tab(
            document.title_or(IMPORTED_TITLE),
            document.kind,
            Some(&document.data),
        )
    }

    pub fn activate(&mut self, id: TabId) -> Result<(), TabError> {
        if !self.tabs.iter().any(|tab| tab.id == id) {
            return Err(TabError::NotFound(id));
        }
        self.active = Some(id);
        Ok(())
    }

    /// Closes a tab. When it was active, the first remaining tab becomes
    /// active; closing the last tab leaves none active.
    pub fn remove(&mut self, id: TabId) -> bool {
        let Some(index) = self.tabs.iter().position(|tab| tab.id == id) else {
            return false;
        };
        self.tabs.remove(index);
        if self.active == Some(id) {
            self.active = self.tabs.first().map(|tab| tab.id);
        }
        tracing::info!(tab_id = %id, remaining = self.tabs.len(), "Closed tab");
        true
    }

    pub fn active_id(&self) -> Option<TabId> {
        self.active
    }

    pub fn is_active(&self, id: TabId) -> bool {
        self.active == Some(id)
    }

    pub fn active(&self) -> Option<&Tab> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn active_mut(&mut self) -> Option<&mut Tab> {
        let id = self.active?;
        self.get_mut(id)
    }

    pub fn get(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    pub fn get_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|tab| tab.id == id)
    }

    pub fn update_title(&mut self, id: TabId, title: impl Into<String>) -> Result<(), TabError> {
        let tab = self.get_mut(id).ok_or(TabError::NotFound(id))?;
        tab.title = title.into();
        Ok(())
    }

    /// Summaries of every tab in display order.
    pub fn all(&self) -> Vec<TabSummary> {
        self.tabs.iter().map(Tab::summary).collect()
    }

    pub fn count(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn close_all(&mut self) {
        let ids: Vec<TabId> = self.tabs.iter().map(|tab| tab.id).collect();
        for id in ids {
            self.remove(id);
        }
    }

    pub fn close_all_except(&mut self, keep: TabId) {
        let ids: Vec<TabId> = self
            .tabs
            .iter()
            .map(|tab| tab.id)
            .filter(|id| *id != keep)
            .collect();
        for id in ids {
            self.remove(id);
        }
    }

    // =========================================================================
    // Import / export
    // =========================================================================

    /// The standalone export document for one tab.
    pub fn export_document(
        &self,
        id: TabId,
        now: DateTime<Utc>,
    ) -> Result<SheetDocument, TabError> {
        let tab = self.get(id).ok_or(TabError::NotFound(id))?;
        Ok(SheetDocument::exported(
            tab.id,
            tab.kind(),
            &tab.title,
            tab.sheet.to_data()?,
            now,
        ))
    }

    /// A single-sheet bundle for one tab.
    pub fn export_tab(&self, id: TabId, now: DateTime<Utc>) -> Result<SheetBundle, TabError> {
        let tab = self.get(id).ok_or(TabError::NotFound(id))?;
        Ok(SheetBundle::single(tab.bundle_sheet()?, now))
    }

    /// A multi-sheet bundle of every open tab. Fails when none are open.
    pub fn export_all(&self, now: DateTime<Utc>) -> Result<SheetBundle, TabError> {
        let sheets = self
            .tabs
            .iter()
            .map(Tab::bundle_sheet)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SheetBundle::multi(sheets, now)?)
    }

    /// Opens every sheet of an import. Returns the new tab ids.
    pub fn import(&mut self, import: &BundleImport) -> Result<Vec<TabId>, TabError> {
        let mut opened = Vec::with_capacity(import.sheets.len());
        for document in &import.sheets {
            opened.push(self.add_document(document)?);
        }
        tracing::info!(imported = opened.len(), skipped = import.rejected.len(), "Imported sheets");
        Ok(opened)
    }
}
