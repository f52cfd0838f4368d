//! Kiosk CLI - Menu inspection, scripted replays and interactive sessions.
//!
//! # Usage
//!
//! ```bash
//! # Print the built-in menu (or the one named by KIOSK_CATALOG_PATH)
//! kiosk-cli menu
//!
//! # Search a custom catalog
//! kiosk-cli menu --catalog menu.yaml --search burger
//!
//! # Replay a YAML list of intents and print every view
//! kiosk-cli replay script.yaml --json
//!
//! # Interactive session on stdin with the real inactivity timer
//! kiosk-cli run
//!
//! # Validate a catalog file
//! kiosk-cli check-catalog menu.yaml
//! ```
//!
//! # Commands
//!
//! - `menu` - Print categories and items, or search hits
//! - `replay` - Run a recorded intent script through a session
//! - `run` - Drive a live session from the terminal
//! - `check-catalog` - Validate a YAML catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "kiosk-cli")]
#[command(author, version, about = "Self-service ordering kiosk")]
struct Cli {
    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the menu
    Menu {
        /// Only show items whose name or description matches
        #[arg(short, long)]
        search: Option<String>,

        /// YAML catalog to use instead of the configured one
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
    /// Replay a YAML intent script through a fresh session
    Replay {
        /// Script file: a YAML list of intents
        script: PathBuf,

        /// Print one JSON object per step instead of text screens
        #[arg(long)]
        json: bool,

        /// YAML catalog to use instead of the configured one
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
    /// Start an interactive session on stdin
    Run {
        /// YAML catalog to use instead of the configured one
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
    /// Validate a YAML catalog
    CheckCatalog {
        /// Catalog file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kiosk=info,kiosk_cli=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Menu { search, catalog } => {
            commands::menu::show(catalog.as_deref(), search.as_deref())?;
        }
        Commands::Replay {
            script,
            json,
            catalog,
        } => commands::replay::replay(&script, json, catalog.as_deref()).await?,
        Commands::Run { catalog } => commands::run::interactive(catalog.as_deref()).await?,
        Commands::CheckCatalog { path } => commands::menu::check(&path)?,
    }
    Ok(())
}
