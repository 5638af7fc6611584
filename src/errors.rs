//! Error types for assemblage operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading and validating a component manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The component directory has no `manifest.json`.
    #[error("component {component} is missing manifest.json")]
    MissingManifest {
        /// Directory name of the component.
        component: String,
    },
    /// The manifest could not be read, is not JSON, or is not a JSON object.
    #[error("manifest.json in component {component} must be a JSON object: {reason}")]
    InvalidManifest {
        /// Directory name of the component.
        component: String,
        /// Why the manifest was rejected.
        reason: String,
    },
    /// A required field is missing or the uuid is malformed.
    #[error("component {component} has invalid manifest.json: {reason}")]
    ValidationFailed {
        /// Directory name of the component.
        component: String,
        /// Which check failed.
        reason: String,
    },
}

/// Errors that can occur in the override store.
///
/// Only writes surface these; reads degrade to "no override".
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be opened or its table could not be created.
    #[error("override store is not available")]
    Unavailable,
    /// The payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// The underlying database reported an error.
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Errors raised while resolving a component's file-layer override.
#[derive(Debug, Error)]
pub enum CustomError {
    /// `custom.json` exists but is unreadable, not JSON, or not an object.
    #[error("custom.json in component {component} must be a JSON object: {reason}")]
    InvalidCustomFile {
        /// Directory name of the component.
        component: String,
        /// Why the file was rejected.
        reason: String,
    },
}

/// Errors raised by the variable substitution engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubstitutionError {
    /// A path expression contains an empty key, e.g. `a->->b`.
    #[error("empty key in path: '{path}'")]
    EmptyKeyInPath {
        /// The full path expression.
        path: String,
    },
    /// A start delimiter has no matching end delimiter.
    #[error("unclosed delimiter at position {position}")]
    UnclosedDelimiter {
        /// Byte offset of the start delimiter.
        position: usize,
    },
    /// A key along the path does not exist.
    #[error("key '{key}' not found at '{traversed}'. Available keys: {available:?}. Full path: '{path}'")]
    KeyNotFound {
        /// The key that failed to resolve.
        key: String,
        /// The part of the path resolved before the failure, or `root`.
        traversed: String,
        /// Keys present at the failing level; empty when that level is not an object.
        available: Vec<String>,
        /// The full path expression.
        path: String,
    },
    /// The path resolved to an object or array.
    #[error("value at path '{path}' has unsupported type {found}. Expected string, number, boolean, or null")]
    UnsupportedSubstitutionType {
        /// The full path expression.
        path: String,
        /// The JSON type that was found.
        found: &'static str,
    },
    /// The lookup root is not a JSON object.
    #[error("expected an object as lookup root, got {found}")]
    InvalidLookupRoot {
        /// The JSON type that was found.
        found: &'static str,
    },
}

/// Error returned by a component init or route hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    /// Creates a hook error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Fatal errors that abort a registry build.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The component directory could not be listed.
    #[error("cannot read component directory {path}: {source}")]
    ComponentDir {
        /// The directory that was scanned.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// An enabled directory name is not of the form `cmp_NNNN_name`.
    #[error("invalid component directory name '{0}'")]
    InvalidDirectoryName(String),
    /// Two components declare the same uuid.
    #[error("uuid {uuid} is declared by both {first} and {second}")]
    DuplicateUuid {
        /// The shared uuid.
        uuid: String,
        /// Directory discovered first.
        first: String,
        /// Directory discovered second.
        second: String,
    },
    /// A manifest failed to load.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    /// A `custom.json` failed to load.
    #[error(transparent)]
    Custom(#[from] CustomError),
    /// A `schema.json` failed to load.
    #[error("schema.json in component {component} is invalid: {reason}")]
    InvalidSchemaFile {
        /// Directory name of the component.
        component: String,
        /// Why the file was rejected.
        reason: String,
    },
    /// An init template exists but could not be read.
    #[error("cannot read init template {path}: {source}")]
    InitTemplate {
        /// The template path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The substitution pass failed.
    #[error("variable substitution failed in {scope}: {source}")]
    Substitution {
        /// `global schema` or `component <name>`.
        scope: String,
        /// The substitution error.
        source: SubstitutionError,
    },
    /// A manifest `route` cannot be used as a mount prefix.
    #[error("component {component} has unusable route '{route}': {reason}")]
    InvalidRoute {
        /// Directory name of the component.
        component: String,
        /// The manifest route.
        route: String,
        /// Why it was rejected.
        reason: String,
    },
    /// A component hook failed.
    #[error("{hook} hook failed for component {component}: {source}")]
    Hook {
        /// `init` or `routes`.
        hook: &'static str,
        /// Directory name of the component.
        component: String,
        /// The hook's error.
        source: HookError,
    },
}

/// Errors raised while loading the engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The configuration file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration file is neither valid JSON nor valid YAML.
    #[error("cannot parse {path}: {reason}")]
    Parse {
        /// The configuration file.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },
}
