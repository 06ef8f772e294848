//! Quality library entries, file formats, and search.
//!
//! Library files are community-maintained JSON in several historic shapes.
//! Entries are validated against the raw JSON before they are accepted, so an
//! entry with a string `dpCost` or a missing description never reaches a
//! sheet.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DomainError;
use crate::sheets::digimon::{QualityEntry, QualityType, Stage};

/// Stage label for qualities any stage can take.
pub const ANY_STAGE: &str = "Any";

pub const QUALITY_EXPORT_APPLICATION: &str = "DDA2E Quality Library";
pub const QUALITY_EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryQuality {
    pub name: String,
    pub dp_cost: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(rename = "type")]
    pub kind: QualityType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// File the entry was loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl LibraryQuality {
    /// Validates raw JSON and builds an entry from it.
    ///
    /// Requires a non-empty `name`, a numeric `dpCost` ≥ 0, a `type` of
    /// Attack/Static/Trigger and a non-empty `description`.
    pub fn from_json(value: &Value) -> Result<Self, DomainError> {
        let object = value
            .as_object()
            .ok_or_else(|| DomainError::validation("Quality must be an object"))?;

        let name = object
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| DomainError::validation("Quality name is required"))?;

        let dp_cost = object
            .get("dpCost")
            .and_then(Value::as_f64)
            .filter(|cost| cost.is_finite() && *cost >= 0.0)
            .ok_or_else(|| {
                DomainError::validation(format!("Quality '{}' needs a dpCost of 0 or more", name))
            })?;

        let kind = object
            .get("type")
            .and_then(Value::as_str)
            .and_then(|label| label.parse::<QualityType>().ok())
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "Quality '{}' must be Attack, Static, or Trigger",
                    name
                ))
            })?;

        let description = object
            .get("description")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                DomainError::validation(format!("Quality '{}' needs a description", name))
            })?;

        let tags = object.get("tags").and_then(Value::as_array).map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        });

        Ok(Self {
            name: name.to_string(),
            dp_cost: dp_cost.trunc() as i32,
            stage: object
                .get("stage")
                .and_then(Value::as_str)
                .filter(|stage| !stage.is_empty())
                .map(str::to_string),
            kind,
            description: description.to_string(),
            tags,
            source: object
                .get("source")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    pub fn is_valid(value: &Value) -> bool {
        Self::from_json(value).is_ok()
    }

    /// Checks an entry built in code against the same rules as `from_json`.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("Quality name is required"));
        }
        if self.dp_cost < 0 {
            return Err(DomainError::validation(format!(
                "Quality '{}' needs a dpCost of 0 or more",
                self.name
            )));
        }
        if self.description.is_empty() {
            return Err(DomainError::validation(format!(
                "Quality '{}' needs a description",
                self.name
            )));
        }
        Ok(())
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// No stage, or "Any", means every stage can take it.
    pub fn is_any_stage(&self) -> bool {
        self.stage
            .as_deref()
            .map_or(true, |stage| stage == ANY_STAGE)
    }

    fn matches_term(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(term)
            || self.description.to_lowercase().contains(term)
            || self
                .tags
                .iter()
                .flatten()
                .any(|tag| tag.to_lowercase().contains(term))
    }

    /// The sheet row this entry adds.
    pub fn to_entry(&self) -> QualityEntry {
        QualityEntry::new(&*self.name, self.kind, self.dp_cost, &*self.description)
    }
}

// =============================================================================
// Manifest
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityManifest {
    pub version: String,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default = "default_base_path")]
    pub base_path: String,
    pub qualities: Vec<ManifestFile>,
}

fn default_base_path() -> String {
    "qualities/".to_string()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestFile {
    pub filename: String,
    pub name: String,
    pub description: String,
    pub count: u32,
    pub types: Vec<QualityType>,
    pub tags: Vec<String>,
}

impl Default for QualityManifest {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            last_updated: "2025-01-07".to_string(),
            base_path: default_base_path(),
            qualities: vec![ManifestFile {
                filename: "core_qualities.json".to_string(),
                name: "Core Qualities".to_string(),
                description: "All Starting Core Qualities".to_string(),
                count: 26,
                types: QualityType::ALL.to_vec(),
                tags: vec!["core".to_string(), "child".to_string(), "data-opt".to_string()],
            }],
        }
    }
}

// =============================================================================
// Library files
// =============================================================================

/// Outcome of reading one library file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedQualityFile {
    pub qualities: Vec<LibraryQuality>,
    /// Validation messages for entries that were dropped.
    pub skipped: Vec<String>,
}

impl ParsedQualityFile {
    fn push(&mut self, value: &Value, source: &str) {
        match LibraryQuality::from_json(value) {
            Ok(quality) => self.qualities.push(quality.with_source(source)),
            Err(err) => self.skipped.push(err.to_string()),
        }
    }
}

/// Reads any supported library file shape.
///
/// Accepts a `quality-collection` document, a single `quality` document, a
/// bare array, or a bare quality object. Every accepted entry records
/// `source` as its origin.
pub fn parse_quality_file(data: &Value, source: &str) -> ParsedQualityFile {
    let mut parsed = ParsedQualityFile::default();
    let kind = data.get("type").and_then(Value::as_str);
    match (kind, data) {
        (Some("quality-collection"), _) if data["qualities"].is_array() => {
            for quality in data["qualities"].as_array().into_iter().flatten() {
                parsed.push(quality, source);
            }
        }
        (Some("quality"), _) if data.get("data").is_some_and(|inner| !inner.is_null()) => {
            parsed.push(&data["data"], source);
        }
        (_, Value::Array(items)) => {
            for quality in items {
                parsed.push(quality, source);
            }
        }
        _ => parsed.push(data, source),
    }
    parsed
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_stage: BTreeMap<String, usize>,
    pub files: usize,
    pub initialized: bool,
}

/// Loaded library entries with search over them.
#[derive(Debug, Clone, Default)]
pub struct QualityCatalog {
    qualities: Vec<LibraryQuality>,
    files: usize,
    initialized: bool,
}

impl QualityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_qualities(qualities: Vec<LibraryQuality>, files: usize) -> Self {
        Self {
            qualities,
            files,
            initialized: true,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn all(&self) -> &[LibraryQuality] {
        &self.qualities
    }

    pub fn len(&self) -> usize {
        self.qualities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.qualities.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&LibraryQuality> {
        self.qualities.iter().find(|quality| quality.name == name)
    }

    pub fn by_type(&self, kind: QualityType) -> Vec<&LibraryQuality> {
        self.qualities
            .iter()
            .filter(|quality| quality.kind == kind)
            .collect()
    }

    /// Filters by a case-insensitive term over name, description and tags,
    /// then by type and stage. Entries without a stage, or staged "Any",
    /// pass every stage filter.
    pub fn search(
        &self,
        term: Option<&str>,
        kind: Option<QualityType>,
        stage: Option<&str>,
    ) -> Vec<&LibraryQuality> {
        let term = term
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);
        self.qualities
            .iter()
            .filter(|quality| term.as_deref().map_or(true, |term| quality.matches_term(term)))
            .filter(|quality| kind.map_or(true, |kind| quality.kind == kind))
            .filter(|quality| {
                stage.map_or(true, |stage| {
                    quality.is_any_stage() || quality.stage.as_deref() == Some(stage)
                })
            })
            .collect()
    }

    pub fn stats(&self) -> LibraryStats {
        let by_type = QualityType::ALL
            .iter()
            .map(|kind| (kind.as_str().to_string(), self.by_type(*kind).len()))
            .collect();

        let mut by_stage: BTreeMap<String, usize> = Stage::ALL
            .iter()
            .map(|stage| {
                let count = self
                    .qualities
                    .iter()
                    .filter(|quality| quality.stage.as_deref() == Some(stage.as_str()))
                    .count();
                (stage.as_str().to_string(), count)
            })
            .collect();
        by_stage.insert(
            ANY_STAGE.to_string(),
            self.qualities
                .iter()
                .filter(|quality| quality.is_any_stage())
                .count(),
        );

        LibraryStats {
            total: self.qualities.len(),
            by_type,
            by_stage,
            files: self.files,
            initialized: self.initialized,
        }
    }
}

// =============================================================================
// Import / export
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityExportData {
    pub name: String,
    pub dp_cost: i32,
    pub stage: String,
    #[serde(rename = "type")]
    pub kind: QualityType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_source: Option<String>,
}

/// Single-quality exchange document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityExport {
    pub version: String,
    pub application: String,
    pub export_date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: QualityExportData,
}

pub fn export_quality(quality: &LibraryQuality, now: DateTime<Utc>) -> QualityExport {
    QualityExport {
        version: QUALITY_EXPORT_VERSION.to_string(),
        application: QUALITY_EXPORT_APPLICATION.to_string(),
        export_date: now,
        kind: "quality".to_string(),
        data: QualityExportData {
            name: quality.name.clone(),
            dp_cost: quality.dp_cost,
            stage: quality
                .stage
                .clone()
                .unwrap_or_else(|| ANY_STAGE.to_string()),
            kind: quality.kind,
            description: quality.description.clone(),
            tags: quality.tags.clone(),
            original_source: quality.source.clone(),
        },
    }
}

/// Reads a quality from an export document or a bare quality object.
///
/// The stage defaults to "Any". Tags and source are not carried over.
pub fn import_quality(data: &Value) -> Result<LibraryQuality, DomainError> {
    if !data.is_object() {
        return Err(DomainError::validation("Invalid file data"));
    }
    let payload = match data.get("data") {
        Some(inner) if data.get("type").and_then(Value::as_str) == Some("quality") => inner,
        _ => data,
    };
    let quality = LibraryQuality::from_json(payload)?;
    Ok(LibraryQuality {
        stage: Some(quality.stage.unwrap_or_else(|| ANY_STAGE.to_string())),
        tags: None,
        source: None,
        ..quality
    })
}
