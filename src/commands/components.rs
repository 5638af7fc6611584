//! # Component Directory Commands
//!
//! `list`, `enable`, `disable` and `reorder` work directly on the component directory and never
//! touch the override store.

use crate::commands::shared::{CommandContext, validate_args_count_or_exit};
use crate::{RenameOutcome, ScannedComponent, cli_utils, component_dir};

const LIST_USAGE: &str = "Usage: cmpctl list [all|enabled|disabled] [--verbose]";

fn format_component(component: &ScannedComponent, verbose: bool) -> String {
    let field = |key: &str| {
        component
            .manifest
            .as_ref()
            .and_then(|m| m.get(key))
            .and_then(|v| v.as_str())
            .unwrap_or("N/A")
            .to_string()
    };
    let status = if component.dir_name.enabled {
        "enabled"
    } else {
        "disabled"
    };
    if verbose {
        let mut lines = vec![
            format!("  Name: {}", component.dir_name),
            format!("  UUID: {}", field("uuid")),
            format!("  Display Name: {}", field("name")),
            format!("  Description: {}", field("description")),
            format!("  Version: {}", field("version")),
            format!("  Route: {}", field("route")),
            format!("  Status: {}", status),
        ];
        if let Some(error) = &component.error {
            lines.push(format!("  Error: {}", error));
        }
        return lines.join("\n");
    }
    let icon = if component.dir_name.enabled { "✓" } else { "✗" };
    format!(
        "  {:<8} {:30} {:20} {}",
        icon,
        component.dir_name.to_string(),
        component.uuid().unwrap_or("N/A"),
        component.display_name().unwrap_or("N/A")
    )
}

/// Handles `cmpctl list [all|enabled|disabled]`.
pub fn handle_list_command(args: &[String], ctx: &CommandContext) {
    validate_args_count_or_exit(args, 1, 2, "list", LIST_USAGE);
    let filter = args.get(1).map(String::as_str).unwrap_or("all");
    let all = component_dir::scan(&ctx.config.component_dir).unwrap_or_else(|e| {
        cli_utils::exit_with_error(&format!(
            "Component directory not found: {}: {}",
            ctx.config.component_dir.display(),
            e
        ))
    });
    let (title, shown): (&str, Vec<&ScannedComponent>) = match filter {
        "all" => ("All Components", all.iter().collect()),
        "enabled" => (
            "Enabled Components",
            all.iter().filter(|c| c.dir_name.enabled).collect(),
        ),
        "disabled" => (
            "Disabled Components",
            all.iter().filter(|c| !c.dir_name.enabled).collect(),
        ),
        other => cli_utils::exit_with_usage_error(
            &format!("Unknown list filter '{}'", other),
            LIST_USAGE,
        ),
    };

    if let Some(format) = ctx.output {
        cli_utils::print_formatted_or_exit(&shown, format, "component list");
        return;
    }

    println!();
    println!("{}", title);
    println!("{}", "=".repeat(80));
    if !ctx.verbose {
        println!("  {:<8} {:30} {:20} Display Name", "Status", "Directory", "UUID");
        println!("  {} {} {} {}", "-".repeat(8), "-".repeat(30), "-".repeat(20), "-".repeat(20));
    }
    if shown.is_empty() {
        println!("  No components found.");
        return;
    }
    for (idx, component) in shown.iter().enumerate() {
        println!("{}", format_component(component, ctx.verbose));
        if ctx.verbose && idx + 1 < shown.len() {
            println!();
        }
    }
    println!();
    println!("Total: {} components", shown.len());
    if filter == "all" {
        let enabled = all.iter().filter(|c| c.dir_name.enabled).count();
        println!("  Enabled: {}", enabled);
        println!("  Disabled: {}", all.len() - enabled);
    }
}

fn report(outcome: Result<RenameOutcome, component_dir::ManageError>, verb: &str, state: &str) {
    match outcome {
        Ok(RenameOutcome::Renamed { from, to }) => {
            cli_utils::print_success(&format!("Component {}: {} -> {}", verb, from, to));
        }
        Ok(RenameOutcome::Unchanged(name)) => {
            cli_utils::print_success(&format!("Component '{}' is already {}", name, state));
        }
        Err(e) => cli_utils::exit_with_error(&e.to_string()),
    }
}

/// Handles `cmpctl enable <component>`.
pub fn handle_enable_command(args: &[String], ctx: &CommandContext) {
    validate_args_count_or_exit(args, 2, 2, "enable", "Usage: cmpctl enable <component>");
    report(
        component_dir::enable(&ctx.config.component_dir, &args[1]),
        "enabled",
        "enabled",
    );
}

/// Handles `cmpctl disable <component>`.
pub fn handle_disable_command(args: &[String], ctx: &CommandContext) {
    validate_args_count_or_exit(args, 2, 2, "disable", "Usage: cmpctl disable <component>");
    report(
        component_dir::disable(&ctx.config.component_dir, &args[1]),
        "disabled",
        "disabled",
    );
}

/// Handles `cmpctl reorder <component> <order>`.
pub fn handle_reorder_command(args: &[String], ctx: &CommandContext) {
    validate_args_count_or_exit(
        args,
        3,
        3,
        "reorder",
        "Usage: cmpctl reorder <component> <order>",
    );
    report(
        component_dir::reorder(&ctx.config.component_dir, &args[1], &args[2]),
        "reordered",
        "at that order",
    );
}
