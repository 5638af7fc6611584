use std::path::{Path, PathBuf};

use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use assemblage::{
    EngineConfig,
    cli_utils::{self, OutputFormat},
    commands::{
        CommandContext, handle_components_command, handle_disable_command, handle_enable_command,
        handle_list_command, handle_override_command, handle_reorder_command,
        handle_schema_command,
    },
};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Options {
    #[arrrg(optional, "Engine configuration file (JSON or YAML)")]
    config: Option<String>,
    #[arrrg(optional, "Directory holding the component directories")]
    component_dir: Option<String>,
    #[arrrg(optional, "Path of the override store database")]
    config_db: Option<String>,
    #[arrrg(optional, "Output format for data commands: json or yaml (default: json)")]
    output: Option<String>,
    #[arrrg(flag, "Show detailed information and debug logging")]
    verbose: bool,
}

const USAGE: &str = r#"Usage: cmpctl [options] <command> [args...]

Options:
  --config <file>          Engine configuration file (JSON or YAML)
  --component-dir <dir>    Directory holding the component directories
  --config-db <file>       Path of the override store database
  --output <format>        Output format for data commands: json or yaml (default: json)
  --verbose                Show detailed information and debug logging

Commands:
  list [all|enabled|disabled]                List components (default: all)
  enable <component>                         Enable a component
  disable <component>                        Disable a component
  reorder <component> <order>                Change the order prefix (0000-9999)
  override list                              List stored overrides
  override get <uuid>                        Show a stored override
  override set <uuid> <json|@file> [enabled] Store an override
  override enable <uuid>                     Re-enable a stored override
  override disable <uuid>                    Disable a stored override without deleting it
  schema [json-pointer]                      Build the registry and print the merged schema
  components                                 Build the registry and print the components

A component can be named by its directory (cmp_7000_hellocomp), by NNNN_name
(7000_hellocomp) or by its symbolic name (hellocomp)."#;

fn load_config(options: &Options) -> EngineConfig {
    let mut config = match &options.config {
        Some(path) => EngineConfig::load(Path::new(path))
            .unwrap_or_else(|e| cli_utils::exit_with_error(&e.to_string())),
        None => EngineConfig::default(),
    };
    if let Some(dir) = &options.component_dir {
        config.component_dir = PathBuf::from(dir);
    }
    if let Some(db) = &options.config_db {
        config.config_db_path = PathBuf::from(db);
    }
    config
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (options, free) = Options::from_command_line_relaxed("USAGE: cmpctl <command> [args...]");

    if free.is_empty() {
        cli_utils::exit_with_usage_error("No command specified", USAGE);
    }
    if free[0] == "help" {
        println!("{}", USAGE);
        return Ok(());
    }

    cli_utils::init_tracing(options.verbose);

    let output = options.output.as_deref().map(|format| {
        format
            .parse::<OutputFormat>()
            .unwrap_or_else(|e| cli_utils::exit_with_usage_error(&e, USAGE))
    });
    let ctx = CommandContext {
        config: load_config(&options),
        output,
        verbose: options.verbose,
    };

    match free[0].as_str() {
        "list" => handle_list_command(&free, &ctx),
        "enable" => handle_enable_command(&free, &ctx),
        "disable" => handle_disable_command(&free, &ctx),
        "reorder" => handle_reorder_command(&free, &ctx),
        "override" => handle_override_command(&free[1..], &ctx).await,
        "schema" => handle_schema_command(&free, &ctx).await,
        "components" => handle_components_command(&free, &ctx).await,
        _ => {
            cli_utils::exit_with_error(&format!(
                "Unknown command '{}'. Available commands: list, enable, disable, reorder, override, schema, components",
                free[0]
            ));
        }
    }

    Ok(())
}
