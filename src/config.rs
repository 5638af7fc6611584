//! Engine configuration.
//!
//! Loaded from a JSON or YAML file; every field has a default so an empty file (or no file at
//! all) is a valid configuration.
//!
//! ```yaml
//! component_dir: src/component
//! config_db_path: var/config.db
//! default_schema: src/app/schema.json
//! debug: true
//! debug_file: /tmp/assemblage-debug
//! debug_expire_secs: 3600
//! bind: 127.0.0.1:8080
//! ```

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Settings for a registry build and the daemon around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding the `cmp_NNNN_name` component directories.
    pub component_dir: PathBuf,
    /// SQLite file of the override store.
    pub config_db_path: PathBuf,
    /// Optional JSON object merged over the engine defaults before any component.
    pub default_schema: Option<PathBuf>,
    /// Requests debug mode; see [`EngineConfig::debug_enabled`].
    pub debug: bool,
    /// File whose modification time keeps debug mode alive.
    pub debug_file: Option<PathBuf>,
    /// How long after the last touch of `debug_file` debug mode stays on. Zero disables it.
    pub debug_expire_secs: u64,
    /// Listen address of `assemblaged`.
    pub bind: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            component_dir: PathBuf::from("component"),
            config_db_path: PathBuf::from("var/config.db"),
            default_schema: None,
            debug: false,
            debug_file: None,
            debug_expire_secs: 0,
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl EngineConfig {
    /// Reads a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_content(path, &content)
    }

    /// Parses configuration text; the extension of `path` picks the format.
    ///
    /// `.json` is parsed as JSON, `.yaml`/`.yml` as YAML, and anything else is tried as JSON and
    /// then as YAML.
    pub fn from_content(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let parse_error = |reason: String| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
            Some("yaml") | Some("yml") => {
                serde_yml::from_str(content).map_err(|e| parse_error(e.to_string()))
            }
            _ => {
                if let Ok(config) = serde_json::from_str::<Self>(content) {
                    Ok(config)
                } else if let Ok(config) = serde_yml::from_str::<Self>(content) {
                    Ok(config)
                } else {
                    Err(parse_error(
                        "ensure it is valid JSON or YAML".to_string(),
                    ))
                }
            }
        }
    }

    /// Whether debug mode is in effect right now.
    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled_at(SystemTime::now())
    }

    /// Whether debug mode is in effect at `now`.
    ///
    /// Requires `debug`, a configured `debug_file` that exists, a positive `debug_expire_secs`,
    /// and a file modification time no older than `debug_expire_secs`.
    pub fn debug_enabled_at(&self, now: SystemTime) -> bool {
        if !self.debug || self.debug_expire_secs == 0 {
            return false;
        }
        let Some(file) = &self.debug_file else {
            return false;
        };
        let Ok(modified) = std::fs::metadata(file).and_then(|meta| meta.modified()) else {
            return false;
        };
        match now.duration_since(modified) {
            Ok(age) => age.as_secs() <= self.debug_expire_secs,
            // touched in the future relative to `now`
            Err(_) => true,
        }
    }
}
