//! Quality library loader.
//!
//! Reads `manifest.json` and every quality file it lists from the library
//! directory. Missing or broken files never fail the load; they are logged
//! and skipped so a partial library is still usable.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde_json::Value;
use thiserror::Error;
use tokio::fs;

use digisheet_domain::qualities::{parse_quality_file, ParsedQualityFile};
use digisheet_domain::{QualityCatalog, QualityManifest};

// Static regex patterns for description previews (compiled once)
static BOLD_MARKER_REGEX: OnceLock<regex_lite::Regex> = OnceLock::new();
static LINE_BREAK_REGEX: OnceLock<regex_lite::Regex> = OnceLock::new();

const MANIFEST_FILENAME: &str = "manifest.json";

/// Default preview length used by listings.
pub const PREVIEW_LENGTH: usize = 200;

/// Errors that can occur while reading one library file.
#[derive(Debug, Error)]
pub enum QualityLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Quality file not found: {0}")]
    NotFound(PathBuf),
    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),
}

/// The loaded library plus the manifest it came from.
///
/// Files resolve relative to the library directory, which is where the
/// manifest lives. The manifest's `basePath` is kept for round-tripping only.
pub struct QualityLibrary {
    dir: PathBuf,
    manifest: Option<QualityManifest>,
    catalog: QualityCatalog,
}

impl QualityLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            manifest: None,
            catalog: QualityCatalog::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn catalog(&self) -> &QualityCatalog {
        &self.catalog
    }

    pub fn manifest(&self) -> Option<&QualityManifest> {
        self.manifest.as_ref()
    }

    /// Loads the manifest and every listed file.
    ///
    /// Does nothing once loaded; call [`reset`](Self::reset) to reload.
    pub async fn load(&mut self) -> &QualityCatalog {
        if self.catalog.is_initialized() {
            return &self.catalog;
        }

        let manifest = self.load_manifest().await;
        let mut qualities = Vec::new();
        for file in &manifest.qualities {
            match self.load_file(&file.filename).await {
                Ok(parsed) => {
                    for reason in &parsed.skipped {
                        tracing::warn!(file = %file.filename, reason = %reason, "Skipped invalid quality");
                    }
                    tracing::debug!(
                        file = %file.filename,
                        added = parsed.qualities.len(),
                        "Loaded quality file"
                    );
                    qualities.extend(parsed.qualities);
                }
                Err(e) => {
                    tracing::warn!(file = %file.filename, error = %e, "Failed to load quality file");
                }
            }
        }

        tracing::info!(
            qualities = qualities.len(),
            files = manifest.qualities.len(),
            "Quality library loaded"
        );
        self.catalog = QualityCatalog::from_qualities(qualities, manifest.qualities.len());
        self.manifest = Some(manifest);
        &self.catalog
    }

    pub fn reset(&mut self) {
        self.manifest = None;
        self.catalog = QualityCatalog::new();
        tracing::debug!("Quality library reset");
    }

    async fn load_manifest(&self) -> QualityManifest {
        let path = self.dir.join(MANIFEST_FILENAME);
        let loaded = match fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str::<QualityManifest>(&content).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match loaded {
            Ok(manifest) => manifest,
            Err(reason) => {
                tracing::warn!(
                    path = %path.display(),
                    reason = %reason,
                    "Could not load quality manifest, using default manifest"
                );
                QualityManifest::default()
            }
        }
    }

    async fn load_file(&self, filename: &str) -> Result<ParsedQualityFile, QualityLoadError> {
        // Prevent path traversal attacks
        if filename.is_empty()
            || filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
        {
            return Err(QualityLoadError::InvalidFilename(filename.to_string()));
        }

        let path = self.dir.join(filename);
        if !path.exists() {
            return Err(QualityLoadError::NotFound(path));
        }

        let content = fs::read_to_string(&path).await?;
        let data: Value = serde_json::from_str(&content)?;
        Ok(parse_quality_file(&data, filename))
    }
}

/// One-line summary of a quality description for listings.
///
/// Strips `**bold**` markers, turns line breaks into spaces, and cuts long
/// text at a word boundary when one falls in the last fifth of the limit.
pub fn preview(description: &str, max_len: usize) -> String {
    let bold = BOLD_MARKER_REGEX.get_or_init(|| {
        regex_lite::Regex::new(r"\*\*(.*?)\*\*").expect("BOLD_MARKER_REGEX pattern is invalid")
    });
    let breaks = LINE_BREAK_REGEX.get_or_init(|| {
        regex_lite::Regex::new(r"\n+").expect("LINE_BREAK_REGEX pattern is invalid")
    });

    let text = bold.replace_all(description, "$1");
    let text = breaks.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max_len).collect();
    if let Some(space) = truncated.rfind(' ') {
        let kept = truncated[..space].chars().count();
        if kept as f64 > max_len as f64 * 0.8 {
            return format!("{}...", &truncated[..space]);
        }
    }
    format!("{}...", truncated)
}
