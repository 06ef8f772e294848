//! File-backed sheet storage.
//!
//! Each key is stored as one JSON file in the data directory. Keys are
//! escaped into filenames so arbitrary sheet titles can never leave the
//! directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::infrastructure::ports::{SheetStore, StorageError};

const ENTRY_EXTENSION: &str = "json";

/// Stores saved sheets as files under a single directory.
///
/// Layout:
/// - Linux: ~/.local/share/digisheet/<escaped key>.json
/// - or whatever `DIGISHEET_DATA_DIR` points at
pub struct FileSheetStore {
    dir: PathBuf,
}

impl FileSheetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self
            .dir
            .join(format!("{}.{}", encode_key(key), ENTRY_EXTENSION)))
    }
}

#[async_trait]
impl SheetStore for FileSheetStore {
    async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match decode_key(stem) {
                Some(key) => keys.push(key),
                None => tracing::warn!(path = %path.display(), "Skipping unrecognized storage file"),
            }
        }
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        fs::create_dir_all(&self.dir).await?;
        fs::write(&path, value).await?;
        tracing::debug!(key = %key, path = %path.display(), "Stored sheet entry");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps `[A-Za-z0-9_-]` and writes every other byte as `%XX`.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

fn decode_key(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}
