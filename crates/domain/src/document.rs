//! Saved and exported sheet documents.
//!
//! A document wraps one sheet's raw model JSON with its type and title.
//! Bundles wrap one or many documents for sharing a whole table.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::ids::TabId;
use crate::sheets::SheetKind;
use crate::types::lenient::lenient;

pub const DOCUMENT_VERSION: &str = "1.0";
pub const APPLICATION_NAME: &str = "Digimon Digital Adventures 2E";
pub const DOCUMENT_EXTENSION: &str = "dda2e";
pub const IMPORTED_TITLE: &str = "Imported Sheet";
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid file format")]
    NotAnObject,

    #[error("Invalid file format. Missing required fields.")]
    MissingFields,

    #[error("Unsupported sheet type: {0}")]
    UnsupportedType(String),

    #[error("Missing or invalid sheet data")]
    InvalidData,

    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),

    #[error("No sheets were imported")]
    NoSheets,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Single documents
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: SheetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub data: Map<String, Value>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub saved_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub export_date: Option<DateTime<Utc>>,
}

impl SheetDocument {
    /// Local save entry: `{id, type, title, data, savedDate}`.
    pub fn saved(
        id: TabId,
        kind: SheetKind,
        title: impl Into<String>,
        data: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            version: None,
            application: None,
            id: Some(id.to_string()),
            kind,
            title: Some(title.into()),
            data,
            saved_date: Some(now),
            export_date: None,
        }
    }

    /// Export file: version and application stamped, blank titles become
    /// "Untitled".
    pub fn exported(
        id: TabId,
        kind: SheetKind,
        title: &str,
        data: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Self {
        let title = if title.trim().is_empty() {
            UNTITLED
        } else {
            title
        };
        Self {
            version: Some(DOCUMENT_VERSION.to_string()),
            application: Some(APPLICATION_NAME.to_string()),
            id: Some(id.to_string()),
            kind,
            title: Some(title.to_string()),
            data,
            saved_date: None,
            export_date: Some(now),
        }
    }

    /// Validates an imported JSON value.
    ///
    /// It must be an object with a `type` of digimon or tamer and an object
    /// `data`. Everything else is optional.
    pub fn from_json(value: &Value) -> Result<Self, DocumentError> {
        let object = value.as_object().ok_or(DocumentError::NotAnObject)?;
        let kind = match object.get("type") {
            None | Some(Value::Null) => return Err(DocumentError::MissingFields),
            Some(Value::String(kind)) => kind
                .parse::<SheetKind>()
                .map_err(|_| DocumentError::UnsupportedType(kind.clone()))?,
            Some(other) => return Err(DocumentError::UnsupportedType(other.to_string())),
        };
        let data = match object.get("data") {
            None | Some(Value::Null) => return Err(DocumentError::MissingFields),
            Some(Value::Object(data)) => data.clone(),
            Some(_) => return Err(DocumentError::InvalidData),
        };
        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        };
        let date = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|date| date.with_timezone(&Utc))
        };
        Ok(Self {
            version: text("version"),
            application: text("application"),
            id: text("id"),
            kind,
            title: text("title"),
            data,
            saved_date: date("savedDate"),
            export_date: date("exportDate"),
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_json(&value)
    }

    /// The title, or `fallback` when the document has none.
    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(fallback)
    }

    pub fn data_value(&self) -> Value {
        Value::Object(self.data.clone())
    }

    pub fn to_pretty_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// `{title}_{type}_{YYYY-MM-DD}.dda2e`
pub fn export_filename(title: &str, kind: SheetKind, date: NaiveDate) -> String {
    format!(
        "{}_{}_{}.{}",
        sanitize_title(title),
        kind,
        date.format("%Y-%m-%d"),
        DOCUMENT_EXTENSION
    )
}

// =============================================================================
// Bundles
// =============================================================================

/// One open tab inside a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleSheet {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: SheetKind,
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum BundleContents {
    #[serde(rename = "single-sheet")]
    Single { sheet: BundleSheet },
    #[serde(rename = "multi-sheet")]
    Multi { sheets: Vec<BundleSheet> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetBundle {
    pub version: String,
    pub application: String,
    pub export_date: DateTime<Utc>,
    #[serde(flatten)]
    pub contents: BundleContents,
}

impl SheetBundle {
    pub fn single(sheet: BundleSheet, now: DateTime<Utc>) -> Self {
        Self::with_contents(BundleContents::Single { sheet }, now)
    }

    /// Fails when there is nothing to export.
    pub fn multi(sheets: Vec<BundleSheet>, now: DateTime<Utc>) -> Result<Self, DocumentError> {
        if sheets.is_empty() {
            return Err(DocumentError::NoSheets);
        }
        Ok(Self::with_contents(BundleContents::Multi { sheets }, now))
    }

    fn with_contents(contents: BundleContents, now: DateTime<Utc>) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            application: APPLICATION_NAME.to_string(),
            export_date: now,
            contents,
        }
    }

    pub fn filename(&self) -> String {
        let date = self.export_date.date_naive().format("%Y-%m-%d");
        match &self.contents {
            BundleContents::Single { sheet } => {
                format!("DDA2E_{}_{}.{}", sheet.title, date, DOCUMENT_EXTENSION)
            }
            BundleContents::Multi { .. } => {
                format!("DDA2E_All_Sheets_{}.{}", date, DOCUMENT_EXTENSION)
            }
        }
    }

    pub fn to_pretty_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Sheets recovered from a bundle file.
#[derive(Debug, Clone, Default)]
pub struct BundleImport {
    pub sheets: Vec<SheetDocument>,
    /// Why each skipped member was rejected.
    pub rejected: Vec<String>,
}

/// Reads a single-sheet or multi-sheet bundle.
///
/// `version` and `application` must be present. Invalid members of a
/// multi-sheet bundle are skipped and reported; a bundle that yields no sheet
/// at all is an error.
pub fn import_bundle(value: &Value) -> Result<BundleImport, DocumentError> {
    let object = value.as_object().ok_or(DocumentError::NotAnObject)?;
    let present = |key: &str| {
        object
            .get(key)
            .is_some_and(|value| !value.is_null() && value.as_str() != Some(""))
    };
    if !present("version") || !present("application") {
        return Err(DocumentError::InvalidBundle(
            "missing version or application".to_string(),
        ));
    }

    let members: Vec<&Value> = match object.get("type").and_then(Value::as_str) {
        Some("single-sheet") if present("sheet") => vec![&object["sheet"]],
        Some("multi-sheet") => match object.get("sheets") {
            Some(Value::Array(sheets)) => sheets.iter().collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let mut import = BundleImport::default();
    for (index, member) in members.into_iter().enumerate() {
        match SheetDocument::from_json(member) {
            Ok(document) => import.sheets.push(document),
            Err(err) => import.rejected.push(format!("sheet {}: {}", index, err)),
        }
    }
    if import.sheets.is_empty() {
        return Err(DocumentError::NoSheets);
    }
    Ok(import)
}
