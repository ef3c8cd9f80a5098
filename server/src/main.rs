use clap::Parser;

use common::config::{ConfigManager, FileContentConfigProvider, Validate};
use common::{log, logger};
use connect4_server::server_config::{DEFAULT_CONFIG_PATH, ServerConfig};
use connect4_server::session_registry::SessionRegistry;
use connect4_server::web_server::{self, WebServerState};

#[derive(Parser)]
#[command(name = "connect4_server")]
struct Args {
    /// YAML config file; defaults are used when it does not exist.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[arg(long)]
    port: Option<u16>,

    #[arg(long)]
    use_log_prefix: bool,

    /// Write the effective configuration to `--config` and exit.
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_manager: ConfigManager<FileContentConfigProvider, ServerConfig> =
        ConfigManager::from_yaml_file(&args.config);
    let mut config = config_manager.get_config()?;
    if let Some(port) = args.port {
        config.port = port;
    }
    config.validate()?;

    let prefix = match (&config.log_prefix, args.use_log_prefix) {
        (Some(prefix), _) => Some(prefix.clone()),
        (None, true) => Some("Server".to_string()),
        (None, false) => None,
    };
    logger::init_logger(prefix);

    if args.write_config {
        config_manager.set_config(&config)?;
        log!("Configuration written to {}", args.config);
        return Ok(());
    }

    let registry = SessionRegistry::new(config.enforce_turn_order);
    if config.enforce_turn_order {
        log!("Turn order enforcement enabled");
    }

    let router = web_server::build_router(
        WebServerState { registry },
        config.static_files_path.as_deref(),
    );
    let listener = web_server::bind(&config).await?;
    log!("Connect4 server listening on {}", listener.local_addr()?);

    let shutdown_signal = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => log!("Shutdown signal received"),
            Err(e) => {
                log!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    web_server::run_web_server(listener, router, shutdown_signal).await?;

    log!("Server shut down gracefully");

    Ok(())
}
