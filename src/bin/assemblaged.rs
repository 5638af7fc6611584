use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrrg::CommandLine;
use arrrg_derive::CommandLine;
use tokio::net::TcpListener;
use tokio::signal;

use assemblage::{
    AdminState, ComponentRegistry, EngineConfig, OverrideStore, PluginTable, cli_utils,
    create_admin_router,
};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Args {
    #[arrrg(optional, "Engine configuration file (JSON or YAML)")]
    config: Option<String>,
    #[arrrg(optional, "Directory holding the component directories")]
    component_dir: Option<String>,
    #[arrrg(optional, "Path of the override store database")]
    config_db: Option<String>,
    #[arrrg(optional, "Address to bind the HTTP server")]
    bind: Option<String>,
    #[arrrg(flag, "Enable verbose logging")]
    verbose: bool,
}

const HELP_TEXT: &str = r#"assemblaged - component host daemon

USAGE:
    assemblaged [OPTIONS]

OPTIONS:
    --config <PATH>          Engine configuration file (JSON or YAML)
    --component-dir <DIR>    Directory holding the component directories [default: component]
    --config-db <PATH>       Path of the override store database [default: var/config.db]
    --bind <ADDR>            Address to bind the HTTP server [default: 127.0.0.1:8080]
    --verbose                Enable verbose logging

DESCRIPTION:
    Builds the component registry once at startup and serves the registered
    route groups. The administrative API is mounted under /admin.

    Debug logging is also enabled when the configuration requests debug mode
    and the debug file was touched within debug_expire_secs.

    The server supports graceful shutdown via Ctrl+C.

ADMIN ENDPOINTS:
      GET    /admin/override         List stored overrides
      GET    /admin/override/{uuid}  Get a stored override
      PUT    /admin/override/{uuid}  Store an override (applies on next start)
      GET    /admin/components       List loaded components
      GET    /admin/schema           Get the merged schema"#;

fn load_config(args: &Args) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(Path::new(path))?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &args.component_dir {
        config.component_dir = PathBuf::from(dir);
    }
    if let Some(db) = &args.config_db {
        config.config_db_path = PathBuf::from(db);
    }
    if let Some(bind) = &args.bind {
        config.bind = bind.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, free) = Args::from_command_line("USAGE: assemblaged [OPTIONS]");

    if !free.is_empty() && free[0] == "help" {
        println!("{}", HELP_TEXT);
        return Ok(());
    }

    let config = load_config(&args)?;
    cli_utils::init_tracing(args.verbose || config.debug_enabled());

    tracing::info!(
        component_dir = %config.component_dir.display(),
        config_db = %config.config_db_path.display(),
        "assemblaged starting"
    );

    let store = OverrideStore::ensure(&config.config_db_path).await;
    let mut registry = ComponentRegistry::build(&config, &store, &PluginTable::new()).await?;
    let routes = registry.take_route_table();
    let registry = Arc::new(registry);

    let admin = create_admin_router(AdminState {
        store,
        registry: Arc::clone(&registry),
    });
    let app = routes.into_router().nest("/admin", admin);

    let listener = TcpListener::bind(&config.bind)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", config.bind, e))?;

    tracing::info!(
        bind = %config.bind,
        components = registry.components().len(),
        "listening"
    );

    let shutdown_signal = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!(error = %e, "server error");
                std::process::exit(1);
            }
        }
        () = shutdown_signal => {
            tracing::info!("shutdown signal received, stopping");
        }
    }

    Ok(())
}
