//! Persistent configuration for batchrep.
//!
//! Stores user settings in `~/.batchrep/config.json`: exclude globs applied
//! to every file discovery, and whether runs default to dry-run.
//!
//! # Example
//!
//! ```no_run
//! use batchrep_core::config::BatchrepConfig;
//!
//! // Load (returns defaults if file doesn't exist)
//! let config = BatchrepConfig::load();
//!
//! for pattern in &config.exclude {
//!     println!("excluding {}", pattern);
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const CONFIG_DIRNAME: &str = ".batchrep";
const CONFIG_FILENAME: &str = "config.json";

fn default_exclude() -> Vec<String> {
    vec![
        ".git/**".to_string(),
        "target/**".to_string(),
        "node_modules/**".to_string(),
    ]
}

/// Persistent batchrep configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchrepConfig {
    /// Root-relative globs never offered to a script.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Report changes without writing them.
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for BatchrepConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            dry_run: false,
        }
    }
}

/// Returns `~/.batchrep`, or `None` when no home directory is known.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIRNAME))
}

impl BatchrepConfig {
    /// Load config from `~/.batchrep/config.json`.
    ///
    /// Returns [`Default`] if the file does not exist or cannot be parsed.
    pub fn load() -> Self {
        config_dir()
            .map(|dir| Self::load_from(dir.join(CONFIG_FILENAME)))
            .unwrap_or_default()
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        std::fs::read_to_string(path.as_ref())
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to `~/.batchrep/config.json`.
    pub fn save(&self) -> std::io::Result<()> {
        let dir = config_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no home directory")
        })?;
        std::fs::create_dir_all(&dir)?;
        self.save_to(dir.join(CONFIG_FILENAME))
    }

    /// Save config as pretty JSON to an explicit path.
    pub fn save_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_excludes_vcs_and_build_dirs() {
        let config = BatchrepConfig::default();
        assert!(config.exclude.contains(&".git/**".to_string()));
        assert!(!config.dry_run);
    }

    #[test]
    fn deserialize_empty_json() {
        let loaded: BatchrepConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(loaded, BatchrepConfig::default());
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = BatchrepConfig {
            exclude: vec!["dist/**".to_string()],
            dry_run: true,
        };
        config.save_to(&path).unwrap();
        assert_eq!(BatchrepConfig::load_from(&path), config);
    }

    #[test]
    fn unparseable_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(BatchrepConfig::load_from(&path), BatchrepConfig::default());
    }

    #[test]
    fn load_returns_default_for_missing_file() {
        // load() should not panic even if the file doesn't exist
        let _ = BatchrepConfig::load();
    }
}
