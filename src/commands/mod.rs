//! # Command Handlers
//!
//! This module contains organized command handlers for the cmpctl CLI application.
//! Each command group is implemented in a dedicated submodule.
//!
//! ## Structure
//!
//! - `components` - Component directory commands (list, enable, disable, reorder)
//! - `overrides` - Override store commands (list, get, set, enable, disable)
//! - `inspect` - Registry build inspection (schema, components)
//! - `shared` - Shared utilities and validation functions

pub mod components;
pub mod inspect;
pub mod overrides;
pub mod shared;

pub use components::{
    handle_disable_command, handle_enable_command, handle_list_command, handle_reorder_command,
};
pub use inspect::{handle_components_command, handle_schema_command};
pub use overrides::handle_override_command;
pub use shared::CommandContext;
