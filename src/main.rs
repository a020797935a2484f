//! Expense Pie Server
//!
//! Run with: cargo run --bin expense-pie
//!
//! # Configuration
//!
//! Settings come from `--config`, or the first config file found in the user
//! config directory, `/etc/expense-pie/`, or the working directory.
//!
//! Environment variables:
//! - `EXPENSE_PIE_HOST`: Host to bind to (default: 0.0.0.0)
//! - `EXPENSE_PIE_PORT`: Port to listen on (default: 8090)
//! - `EXPENSE_PIE_TRANSITION_MS`: Slice transition duration (default: 750)
//! - `EXPENSE_PIE_LOG_LEVEL`: Log level (default: info)
//! - `EXPENSE_PIE_LOG_FORMAT`: `pretty` or `json` (default: pretty)
//! - `RUST_LOG`: Full filter directive, wins over the log level

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use expense_pie::api::{serve, AppState};
use expense_pie::config::{generate_default_config, Config, LoggingConfig};
use expense_pie::feed::ChangeFeed;
use expense_pie::session::ChartSession;
use expense_pie::store::MemoryCollection;
use expense_pie::websocket::{ConnectionHub, HubConfig};

#[derive(Parser)]
#[command(name = "expense-pie")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live expense pie chart server")]
struct Args {
    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a default config file and exit
    PrintConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(Command::PrintConfig) = args.command {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }

    init_tracing(&config.logging);

    tracing::info!("Starting Expense Pie v{}", env!("CARGO_PKG_VERSION"));

    let collection = Arc::new(MemoryCollection::with_seed(config.seed.clone())?);
    tracing::info!(records = collection.len().await, "Collection ready");

    let hub = Arc::new(ConnectionHub::new(HubConfig {
        max_connections: config.api.max_connections,
    }));

    let feed = ChangeFeed::subscribe(collection.as_ref()).await?;
    let (session, session_task) = ChartSession::new(collection.clone(), &config.chart)
        .with_hub(Arc::clone(&hub))
        .spawn(feed);

    let state = AppState::new(collection, session.clone(), config, hub);

    tracing::info!("Starting server on {}", state.config.api.addr());
    serve(state).await?;

    session.shutdown().await;
    if let Err(e) = session_task.await {
        tracing::error!(error = %e, "Chart session task failed");
    }

    tracing::info!("Expense Pie stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "expense_pie={},tower_http=info",
            logging.level
        ))
    });
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
    }
}
