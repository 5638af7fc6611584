//! # Component Directory Names
//!
//! A component lives in a directory whose name carries its state:
//!
//! ```text
//! cmp_7000_hellocomp      enabled, order 7000, symbolic name "hellocomp"
//! _cmp_7000_hellocomp     the same component, disabled
//! cmp_9100_catch_all      order 9xxx: a catch-all component, registered last
//! ```
//!
//! Enabling, disabling and reordering a component are plain renames. This module parses the
//! convention once into [`ComponentDirName`] and implements the renames used by `cmpctl`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::manifest::MANIFEST_FILE;

/// Prefix of an enabled component directory.
pub const ENABLED_PREFIX: &str = "cmp_";
/// Prefix of a disabled component directory.
pub const DISABLED_PREFIX: &str = "_cmp_";
/// Highest order a directory name can carry.
pub const MAX_ORDER: u16 = 9999;
/// Orders at or above this value mark catch-all components.
pub const CATCH_ALL_MIN_ORDER: u16 = 9000;

static DIR_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(_?)cmp_([0-9]{4})_(.+)$").expect("directory name pattern is valid")
});

/// Parsed form of a component directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ComponentDirName {
    /// `true` for `cmp_`, `false` for `_cmp_`.
    pub enabled: bool,
    /// The four digit order prefix.
    pub order: u16,
    /// Everything after the order prefix.
    pub symbolic_name: String,
}

impl ComponentDirName {
    /// Parses a directory name, returning `None` when it does not follow the convention.
    pub fn parse(name: &str) -> Option<Self> {
        let captures = DIR_NAME_RE.captures(name)?;
        let order = captures.get(2)?.as_str().parse().ok()?;
        Some(Self {
            enabled: captures.get(1)?.as_str().is_empty(),
            order,
            symbolic_name: captures.get(3)?.as_str().to_string(),
        })
    }

    /// Whether this component belongs to the catch-all group.
    pub fn is_catch_all(&self) -> bool {
        self.order >= CATCH_ALL_MIN_ORDER
    }

    /// The `NNNN_name` part shared by the enabled and disabled forms.
    pub fn stem(&self) -> String {
        format!("{:04}_{}", self.order, self.symbolic_name)
    }

    /// Returns the same name with a different enabled state.
    pub fn with_enabled(&self, enabled: bool) -> Self {
        Self {
            enabled,
            ..self.clone()
        }
    }

    /// Returns the same name with a different order.
    pub fn with_order(&self, order: u16) -> Self {
        Self {
            order,
            ..self.clone()
        }
    }

    /// Whether `query` designates this component.
    ///
    /// Accepts the full directory name in either state, the `NNNN_name` stem, or the bare
    /// symbolic name.
    pub fn matches(&self, query: &str) -> bool {
        let stem = self.stem();
        query == self.symbolic_name
            || query == stem
            || query == format!("{}{}", ENABLED_PREFIX, stem)
            || query == format!("{}{}", DISABLED_PREFIX, stem)
    }
}

impl fmt::Display for ComponentDirName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.enabled {
            ENABLED_PREFIX
        } else {
            DISABLED_PREFIX
        };
        write!(f, "{}{}", prefix, self.stem())
    }
}

/// Error returned when a directory name does not follow the convention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a component directory name (expected cmp_NNNN_name or _cmp_NNNN_name)")]
pub struct DirNameParseError(pub String);

impl FromStr for ComponentDirName {
    type Err = DirNameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DirNameParseError(s.to_string()))
    }
}

/// A component directory found by [`scan`], enabled or not.
#[derive(Debug, Clone, Serialize)]
pub struct ScannedComponent {
    /// The parsed directory name.
    pub dir_name: ComponentDirName,
    /// Full path of the directory.
    pub path: PathBuf,
    /// The manifest, when it exists and parses.
    pub manifest: Option<Value>,
    /// Why the manifest could not be read, if it exists but is broken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScannedComponent {
    fn manifest_str(&self, field: &str) -> Option<&str> {
        self.manifest.as_ref()?.get(field)?.as_str()
    }

    /// The manifest uuid, if readable.
    pub fn uuid(&self) -> Option<&str> {
        self.manifest_str("uuid")
    }

    /// The manifest display name, if readable.
    pub fn display_name(&self) -> Option<&str> {
        self.manifest_str("name")
    }
}

/// Lists every component directory under `dir`, enabled and disabled, sorted by name.
///
/// Manifests are read best-effort; this listing never fails because of one component.
pub fn scan(dir: &Path) -> std::io::Result<Vec<ScannedComponent>> {
    let mut found = Vec::new();
    for (name, path) in sorted_subdirectories(dir)? {
        let Some(dir_name) = ComponentDirName::parse(&name) else {
            continue;
        };
        let manifest_path = path.join(MANIFEST_FILE);
        let (manifest, error) = if manifest_path.is_file() {
            match fs::read_to_string(&manifest_path)
                .map_err(|e| e.to_string())
                .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
            {
                Ok(value) => (Some(value), None),
                Err(e) => (None, Some(e)),
            }
        } else {
            (None, None)
        };
        found.push(ScannedComponent {
            dir_name,
            path,
            manifest,
            error,
        });
    }
    Ok(found)
}

/// Returns `(name, path)` of every subdirectory of `dir`, sorted by name.
pub(crate) fn sorted_subdirectories(dir: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            entries.push((name.to_string(), path.clone()));
        }
    }
    entries.sort();
    Ok(entries)
}

/// Errors from the rename-based management operations.
#[derive(Debug, Error)]
pub enum ManageError {
    /// No component matches the query.
    #[error("component '{0}' not found")]
    NotFound(String),
    /// More than one component matches the query.
    #[error("multiple components match '{query}': {}. Please specify the full component name", .matches.join(", "))]
    Ambiguous {
        /// The query as given.
        query: String,
        /// Directory names of every match.
        matches: Vec<String>,
    },
    /// The order is outside `0..=9999`.
    #[error("order must be a number between 0000 and 9999, got '{0}'")]
    InvalidOrder(String),
    /// The rename target already exists.
    #[error("component '{0}' already exists")]
    AlreadyExists(String),
    /// The rename failed.
    #[error("error renaming component: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a management operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The directory was renamed.
    Renamed {
        /// Old directory name.
        from: String,
        /// New directory name.
        to: String,
    },
    /// The component was already in the requested state.
    Unchanged(String),
}

fn find_one(dir: &Path, query: &str) -> Result<ScannedComponent, ManageError> {
    let mut matches: Vec<ScannedComponent> = scan(dir)?
        .into_iter()
        .filter(|c| c.dir_name.matches(query))
        .collect();
    match matches.len() {
        0 => Err(ManageError::NotFound(query.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(ManageError::Ambiguous {
            query: query.to_string(),
            matches: matches.iter().map(|c| c.dir_name.to_string()).collect(),
        }),
    }
}

fn rename_to(
    dir: &Path,
    found: &ScannedComponent,
    target: ComponentDirName,
) -> Result<RenameOutcome, ManageError> {
    let from = found.dir_name.to_string();
    let to = target.to_string();
    if from == to {
        return Ok(RenameOutcome::Unchanged(from));
    }
    let new_path = dir.join(&to);
    if new_path.exists() {
        return Err(ManageError::AlreadyExists(to));
    }
    fs::rename(&found.path, &new_path)?;
    tracing::info!(from = %from, to = %to, "component renamed");
    Ok(RenameOutcome::Renamed { from, to })
}

/// Enables a component by renaming `_cmp_NNNN_name` to `cmp_NNNN_name`.
pub fn enable(dir: &Path, query: &str) -> Result<RenameOutcome, ManageError> {
    let found = find_one(dir, query)?;
    let target = found.dir_name.with_enabled(true);
    rename_to(dir, &found, target)
}

/// Disables a component by renaming `cmp_NNNN_name` to `_cmp_NNNN_name`.
pub fn disable(dir: &Path, query: &str) -> Result<RenameOutcome, ManageError> {
    let found = find_one(dir, query)?;
    let target = found.dir_name.with_enabled(false);
    rename_to(dir, &found, target)
}

/// Changes the order prefix of a component, keeping its enabled state.
pub fn reorder(dir: &Path, query: &str, order: &str) -> Result<RenameOutcome, ManageError> {
    let order: u16 = order
        .trim()
        .parse()
        .ok()
        .filter(|n| *n <= MAX_ORDER)
        .ok_or_else(|| ManageError::InvalidOrder(order.to_string()))?;
    let found = find_one(dir, query)?;
    let target = found.dir_name.with_order(order);
    rename_to(dir, &found, target)
}
