//! SINMAM - Heart Rate Monitoring Service
//!
//! Entry point for the `sinmam` binary: resolves configuration, sets up
//! logging and starts the HTTP API.

mod cli;

use clap::{Parser, Subcommand};
use sinmam_core::{error::Result, Settings};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "sinmam")]
#[command(about = "In-memory heart rate monitoring service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Configuration file (TOML); environment variables still override it
    #[arg(short, long, env = "SINMAM_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server (default)
    Serve {
        /// Server address (overrides configuration)
        #[arg(long)]
        addr: Option<String>,

        /// Generate synthetic readings (demo mode, never for real monitoring)
        #[arg(long)]
        simulate: bool,
    },

    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Use the requested level for our crates, keep HTTP internals quiet
    // unless debugging
    let http_level = if level >= Level::DEBUG { "debug" } else { "warn" };
    let filter = EnvFilter::new(format!(
        "sinmam={lvl},sinmam_core={lvl},tower_http={http},hyper={http}",
        lvl = level.as_str().to_lowercase(),
        http = http_level,
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("SINMAM v{} starting...", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Serve { addr, simulate }) => {
            cli::serve::handle(settings, addr, simulate).await
        }
        Some(Commands::Config) => cli::config::handle(&settings),
        None => cli::serve::handle(settings, None, false).await,
    }
}
