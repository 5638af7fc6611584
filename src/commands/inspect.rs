//! # Inspection Commands
//!
//! `schema` and `components` run a full registry build (without code hooks) and print what it
//! produced.

use crate::cli_utils;
use crate::commands::shared::{CommandContext, build_registry_or_exit, validate_args_count_or_exit};

/// Handles `cmpctl schema [json-pointer]`.
pub async fn handle_schema_command(args: &[String], ctx: &CommandContext) {
    validate_args_count_or_exit(args, 1, 2, "schema", "Usage: cmpctl schema [json-pointer]");
    let registry = build_registry_or_exit(ctx).await;
    match args.get(1) {
        Some(pointer) => match registry.schema().pointer(pointer) {
            Some(value) => cli_utils::print_formatted_or_exit(value, ctx.output_format(), "schema"),
            None => cli_utils::exit_with_error(&format!("Nothing at '{}'", pointer)),
        },
        None => cli_utils::print_formatted_or_exit(registry.schema(), ctx.output_format(), "schema"),
    }
}

/// Handles `cmpctl components`.
pub async fn handle_components_command(args: &[String], ctx: &CommandContext) {
    validate_args_count_or_exit(args, 1, 1, "components", "Usage: cmpctl components");
    let registry = build_registry_or_exit(ctx).await;
    cli_utils::print_formatted_or_exit(&registry.components(), ctx.output_format(), "components");
}
