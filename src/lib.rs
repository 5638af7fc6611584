//! # Assemblage: Component Composition for Web Application Skeletons
//!
//! An application built on assemblage is a directory of pluggable components. Each component
//! is a directory carrying a manifest, optional configuration contributions and optional code
//! hooks. At startup the engine assembles them into one configuration document and one routing
//! table:
//!
//! - **Discovery**: directories named `cmp_NNNN_name` are loaded in name order; `_cmp_NNNN_name`
//!   directories are disabled
//! - **Overrides**: every component may be overridden by a shipped `custom.json` and, on top of
//!   that, by an entry in a SQLite override store managed at runtime
//! - **Schema merge**: component `schema.json` files are deep-merged into the Global Schema Tree
//! - **Substitution**: `[:; a -> b :]` references inside the tree are resolved against the tree
//! - **Hooks**: per-component init hooks adjust their fragment; route hooks return axum routers
//! - **Routing**: route groups are registered in a precedence-aware order, catch-all components
//!   (`9xxx`) last
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ assemblaged / cmpctl                    │
//! ├─────────────────────────────────────────┤
//! │ Admin API (axum)      Route table       │
//! ├─────────────────────────────────────────┤
//! │ Component registry (startup pass)       │
//! ├─────────────────────────────────────────┤
//! │ Manifests  Overrides  Merge  Substitute │
//! ├─────────────────────────────────────────┤
//! │ Component directory   Override store    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use assemblage::{ComponentRegistry, EngineConfig, OverrideStore, PluginTable};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::default();
//! let store = OverrideStore::ensure(&config.config_db_path).await;
//! let registry = ComponentRegistry::build(&config, &store, &PluginTable::new()).await?;
//!
//! for component in registry.components() {
//!     println!("{} {}", component.uuid, component.name);
//! }
//! let request_schema = registry.schema().request_copy();
//! # let _ = request_schema;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
mod admin;
mod component_dir;
mod config;
mod custom;
mod errors;
mod manifest;
mod merge;
mod override_store;
mod plugin;
mod registry;
mod routes;
mod schema;
mod substitute;

// CLI utility modules

/// Command-line interface utilities for logging setup, program termination and output
/// formatting.
pub mod cli_utils;

/// Command-line interface command handlers.
///
/// This module contains the command handlers of the cmpctl CLI application, with each command
/// group implemented in a dedicated submodule.
pub mod commands;

pub use admin::{
    AdminState, SaveOverrideRequest, SaveOverrideResponse, create_admin_router, validate_save,
};
pub use component_dir::{
    CATCH_ALL_MIN_ORDER, ComponentDirName, DISABLED_PREFIX, DirNameParseError, ENABLED_PREFIX,
    MAX_ORDER, ManageError, RenameOutcome, ScannedComponent, disable, enable, reorder, scan,
};
pub use config::EngineConfig;
pub use custom::{CUSTOM_FILE, load_custom_file, resolve_custom};
pub use errors::{
    ConfigError, CustomError, HookError, ManifestError, RegistryError, StoreError,
    SubstitutionError,
};
pub use manifest::{
    ComponentUuid, MANIFEST_FILE, Manifest, REQUIRED_FIELDS, UUID_MAX_LEN, UUID_MIN_LEN,
    is_valid_uuid, load_manifest,
};
pub use merge::{merge_objects, merge_values, merged};
pub use override_store::{OverrideEntry, OverrideStore, OverrideSummary, StoreResult};
pub use plugin::{ComponentPlugin, InitHook, PluginTable, RouteHook};
pub use registry::{
    ComponentDescriptor, ComponentRegistry, INIT_TEMPLATE_FILE, SCHEMA_FILE, TEMPLATE_DIR,
};
pub use routes::{
    MAX_REPLAYED_BODY, ROUTE_GROUP_PREFIX, RouteGroup, RouteTable, registration_order,
    route_group_name,
};
pub use schema::{COMPONENT_SNIPPET_NAME, GlobalSchema, MAP_BY_NAME, MAP_BY_UUID};
pub use substitute::{
    END_DELIMITER, PATH_SEPARATOR, START_DELIMITER, parse_path, resolve_path, substitute,
    substitute_tree,
};
