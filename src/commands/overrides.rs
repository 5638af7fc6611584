//! # Override Command Handler
//!
//! This module handles `cmpctl override` commands against the override store. Changes apply on
//! the next registry build.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::commands::shared::{
    CommandContext, dispatch_command, open_store_or_exit, parse_bool_or_exit, parse_uuid_or_exit,
    validate_args_count_or_exit,
};
use crate::{ComponentUuid, OverrideEntry, cli_utils, component_dir};

const OVERRIDE_USAGE: &str = "Usage: cmpctl override <list|get|set|enable|disable> [args...]";
const SET_USAGE: &str = "Usage: cmpctl override set <uuid> <json|@file> [enabled]";

/// Handles all override-related commands.
///
/// # Arguments
/// * `args` - Command arguments (first element is the subcommand)
/// * `ctx` - Configuration and output settings
pub async fn handle_override_command(args: &[String], ctx: &CommandContext) {
    dispatch_command!("override", OVERRIDE_USAGE, args, ctx, {
        "list" => handle_override_list,
        "get" => handle_override_get,
        "set" => handle_override_set,
        "enable" => handle_override_enable,
        "disable" => handle_override_disable,
    });
}

async fn handle_override_list(args: &[String], ctx: &CommandContext) {
    validate_args_count_or_exit(args, 1, 1, "list", "Usage: cmpctl override list");
    let store = open_store_or_exit(ctx).await;
    let entries = store.list_entries().await;
    cli_utils::print_formatted_or_exit(&entries, ctx.output_format(), "override list");
}

/// Printable form of a stored override with its payload decoded.
#[derive(Debug, Serialize)]
struct OverrideView {
    uuid: String,
    enabled: bool,
    updated_at: i64,
    value: Value,
}

impl From<OverrideEntry> for OverrideView {
    fn from(entry: OverrideEntry) -> Self {
        let value = serde_json::from_str(&entry.raw_payload)
            .unwrap_or_else(|_| Value::String(entry.raw_payload.clone()));
        Self {
            uuid: entry.uuid,
            enabled: entry.enabled,
            updated_at: entry.updated_at.timestamp(),
            value,
        }
    }
}

async fn handle_override_get(args: &[String], ctx: &CommandContext) {
    validate_args_count_or_exit(args, 2, 2, "get", "Usage: cmpctl override get <uuid>");
    let uuid = parse_uuid_or_exit(&args[1]);
    let store = open_store_or_exit(ctx).await;
    match store.get_entry(uuid.as_str()).await {
        Some(entry) => cli_utils::print_formatted_or_exit(
            &OverrideView::from(entry),
            ctx.output_format(),
            "override",
        ),
        None => cli_utils::exit_with_error(&format!("No override stored for '{}'", uuid)),
    }
}

/// Parses the value argument of `override set`: inline JSON or `@path`.
fn parse_payload(arg: &str) -> Result<Map<String, Value>, String> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read file {}: {}", path, e))?,
        None => arg.to_string(),
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("Override value must be a JSON object".to_string()),
        Err(e) => Err(format!("Override value is not valid JSON: {}", e)),
    }
}

fn require_known_component(ctx: &CommandContext, uuid: &ComponentUuid) {
    let scanned = component_dir::scan(&ctx.config.component_dir).unwrap_or_else(|e| {
        cli_utils::exit_with_error(&format!(
            "Component directory not found: {}: {}",
            ctx.config.component_dir.display(),
            e
        ))
    });
    if !scanned.iter().any(|c| c.uuid() == Some(uuid.as_str())) {
        cli_utils::exit_with_error(&format!("No component has uuid '{}'", uuid));
    }
}

async fn handle_override_set(args: &[String], ctx: &CommandContext) {
    validate_args_count_or_exit(args, 3, 4, "set", SET_USAGE);
    let uuid = parse_uuid_or_exit(&args[1]);
    let payload = parse_payload(&args[2]).unwrap_or_else(|e| cli_utils::exit_with_error(&e));
    let enabled = args
        .get(3)
        .map(|v| parse_bool_or_exit(v, "enabled flag"))
        .unwrap_or(true);
    require_known_component(ctx, &uuid);
    let store = open_store_or_exit(ctx).await;
    store
        .upsert(uuid.as_str(), &payload, enabled)
        .await
        .unwrap_or_else(|e| cli_utils::exit_with_error(&format!("Failed to save override: {}", e)));
    cli_utils::print_success(&format!(
        "Override saved for {} ({})",
        uuid,
        if enabled { "enabled" } else { "disabled" }
    ));
}

async fn toggle(args: &[String], ctx: &CommandContext, enabled: bool) {
    let command = if enabled { "enable" } else { "disable" };
    validate_args_count_or_exit(
        args,
        2,
        2,
        command,
        &format!("Usage: cmpctl override {} <uuid>", command),
    );
    let uuid = parse_uuid_or_exit(&args[1]);
    let store = open_store_or_exit(ctx).await;
    match store.set_enabled(uuid.as_str(), enabled).await {
        Ok(true) => cli_utils::print_success(&format!("Override {}d for {}", command, uuid)),
        Ok(false) => cli_utils::exit_with_error(&format!("No override stored for '{}'", uuid)),
        Err(e) => cli_utils::exit_with_error(&format!("Failed to {} override: {}", command, e)),
    }
}

async fn handle_override_enable(args: &[String], ctx: &CommandContext) {
    toggle(args, ctx, true).await;
}

async fn handle_override_disable(args: &[String], ctx: &CommandContext) {
    toggle(args, ctx, false).await;
}
