//! # Shared Command Utilities
//!
//! This module provides shared validation, parsing, and utility functions
//! used across multiple command handlers to reduce code duplication.

use crate::cli_utils::{self, OutputFormat};
use crate::{ComponentRegistry, ComponentUuid, EngineConfig, OverrideStore, PluginTable};

/// Everything a command handler needs besides its arguments.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// Engine configuration after command-line overrides.
    pub config: EngineConfig,
    /// Output format requested with `--output`, if any.
    pub output: Option<OutputFormat>,
    /// Whether `--verbose` was given.
    pub verbose: bool,
}

impl CommandContext {
    /// The requested output format, JSON when none was given.
    pub fn output_format(&self) -> OutputFormat {
        self.output.unwrap_or_default()
    }
}

/// Validates and parses a component uuid.
///
/// # Returns
/// The parsed uuid, or exits the program with an error message
pub fn parse_uuid_or_exit(uuid_str: &str) -> ComponentUuid {
    uuid_str.parse().unwrap_or_else(|e: String| {
        cli_utils::exit_with_usage_error(
            &e,
            "Component uuids are 9 to 50 characters of [a-z0-9_] with at least one underscore",
        )
    })
}

/// Parses an on/off style flag.
pub fn parse_bool_or_exit(value: &str, what: &str) -> bool {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => cli_utils::exit_with_error(&format!(
            "Invalid {} '{}': use true or false",
            what, value
        )),
    }
}

/// Validates both minimum and maximum argument counts.
///
/// # Arguments
/// * `args` - The command arguments array
/// * `min_count` - The minimum number of arguments required (including subcommand)
/// * `max_count` - The maximum number of arguments allowed (including subcommand)
/// * `command` - The command name for error message
/// * `usage` - The usage string to display
pub fn validate_args_count_or_exit(
    args: &[String],
    min_count: usize,
    max_count: usize,
    command: &str,
    usage: &str,
) {
    if args.len() < min_count {
        cli_utils::exit_with_usage_error(
            &format!("{} command requires more arguments", command),
            usage,
        );
    }
    if args.len() > max_count {
        cli_utils::exit_with_usage_error(
            &format!("{} command has too many arguments", command),
            usage,
        );
    }
}

/// Opens the override store, exiting when it cannot be used.
pub async fn open_store_or_exit(ctx: &CommandContext) -> OverrideStore {
    let store = OverrideStore::ensure(&ctx.config.config_db_path).await;
    if !store.is_ready() {
        cli_utils::exit_with_error(&format!(
            "Override store {} is not available",
            ctx.config.config_db_path.display()
        ));
    }
    store
}

/// Runs a registry build without plugins, exiting on any fatal error.
pub async fn build_registry_or_exit(ctx: &CommandContext) -> ComponentRegistry {
    let store = OverrideStore::ensure(&ctx.config.config_db_path).await;
    ComponentRegistry::build(&ctx.config, &store, &PluginTable::new())
        .await
        .unwrap_or_else(|e| cli_utils::exit_with_error(&format!("Failed to build registry: {}", e)))
}

/// Macro to generate command dispatcher boilerplate.
macro_rules! dispatch_command {
    ($command_name:expr, $usage:expr, $args:expr, $ctx:expr, {
        $($subcommand:expr => $handler:expr),* $(,)?
    }) => {
        if $args.is_empty() {
            crate::cli_utils::exit_with_usage_error(
                &format!("{} command requires a subcommand", $command_name),
                $usage,
            );
        }

        match $args[0].as_str() {
            $(
                $subcommand => $handler($args, $ctx).await,
            )*
            _ => {
                let available_subcommands = vec![$($subcommand),*];
                crate::cli_utils::exit_with_error(&format!(
                    "Unknown {} subcommand '{}'. Available subcommands: {}",
                    $command_name,
                    $args[0],
                    available_subcommands.join(", ")
                ));
            }
        }
    };
}

pub(crate) use dispatch_command;
