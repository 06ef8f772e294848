//! Reading and writing `.dda2e` files.
//!
//! A file holds either a single sheet document or a bundle of sheets. Both
//! are pretty-printed JSON.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tokio::fs;

use digisheet_domain::document::{export_filename, import_bundle, BundleImport};
use digisheet_domain::{DocumentError, SheetBundle, SheetDocument};

/// Errors that can occur while reading or writing sheet files.
#[derive(Debug, Error)]
pub enum DocumentFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl From<serde_json::Error> for DocumentFileError {
    fn from(e: serde_json::Error) -> Self {
        Self::Document(DocumentError::Json(e))
    }
}

/// Reads imports from anywhere and writes exports into one directory.
pub struct DocumentFiles {
    export_dir: PathBuf,
}

impl DocumentFiles {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Reads a sheet file of either shape.
    ///
    /// Bundles go through bundle validation and may report rejected members.
    /// Anything else must be a single valid sheet document.
    pub async fn import(&self, path: &Path) -> Result<BundleImport, DocumentFileError> {
        let value = read_json(path).await?;
        let is_bundle = matches!(
            value.get("type").and_then(Value::as_str),
            Some("single-sheet" | "multi-sheet")
        );

        let import = if is_bundle {
            import_bundle(&value)?
        } else {
            BundleImport {
                sheets: vec![SheetDocument::from_json(&value)?],
                rejected: Vec::new(),
            }
        };

        for reason in &import.rejected {
            tracing::warn!(path = %path.display(), reason = %reason, "Skipped invalid sheet in bundle");
        }
        tracing::info!(
            path = %path.display(),
            sheets = import.sheets.len(),
            "Imported sheet file"
        );
        Ok(import)
    }

    /// Writes an exported document as `{title}_{type}_{date}.dda2e`.
    pub async fn export_document(
        &self,
        document: &SheetDocument,
    ) -> Result<PathBuf, DocumentFileError> {
        let date = document
            .export_date
            .or(document.saved_date)
            .map(|date| date.date_naive())
            .unwrap_or_default();
        let filename = export_filename(document.title_or(""), document.kind, date);
        self.write(&filename, &document.to_pretty_json()?).await
    }

    pub async fn export_bundle(&self, bundle: &SheetBundle) -> Result<PathBuf, DocumentFileError> {
        self.write(&bundle.filename(), &bundle.to_pretty_json()?)
            .await
    }

    async fn write(&self, filename: &str, contents: &str) -> Result<PathBuf, DocumentFileError> {
        fs::create_dir_all(&self.export_dir).await?;
        let path = self.export_dir.join(filename);
        fs::write(&path, contents).await?;
        tracing::info!(path = %path.display(), "Exported sheet file");
        Ok(path)
    }
}

async fn read_json(path: &Path) -> Result<Value, DocumentFileError> {
    if !path.exists() {
        return Err(DocumentFileError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}
