//! Runtime configuration from the environment.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Log filter used when neither `RUST_LOG` nor `DIGISHEET_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "digisheet_engine=info";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Where saved sheets live.
    pub data_dir: PathBuf,
    /// Directory holding the quality library's `manifest.json`.
    pub quality_dir: PathBuf,
    pub log_filter: String,
}

impl AppConfig {
    /// Reads `DIGISHEET_DATA_DIR`, `DIGISHEET_QUALITY_DIR` and `DIGISHEET_LOG`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let data_dir = non_empty("DIGISHEET_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let quality_dir = non_empty("DIGISHEET_QUALITY_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("qualities"));
        let log_filter = non_empty("DIGISHEET_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.into());

        Self {
            data_dir,
            quality_dir,
            log_filter,
        }
    }
}

fn default_data_dir() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("io", "digisheet", "digisheet") {
        dirs.data_dir().join("sheets")
    } else {
        // Fallback to current directory if project dirs unavailable
        PathBuf::from("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.quality_dir, PathBuf::from("qualities"));
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert!(config.data_dir.ends_with("data") || config.data_dir.ends_with("sheets"));
    }

    #[test]
    fn overrides_from_environment() {
        let config = config_from(&[
            ("DIGISHEET_DATA_DIR", "/tmp/sheets"),
            ("DIGISHEET_QUALITY_DIR", "/srv/qualities"),
            ("DIGISHEET_LOG", "digisheet_engine=debug"),
        ]);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/sheets"));
        assert_eq!(config.quality_dir, PathBuf::from("/srv/qualities"));
        assert_eq!(config.log_filter, "digisheet_engine=debug");
    }

    #[test]
    fn blank_values_fall_back() {
        let config = config_from(&[("DIGISHEET_QUALITY_DIR", "  ")]);
        assert_eq!(config.quality_dir, PathBuf::from("qualities"));
    }
}
