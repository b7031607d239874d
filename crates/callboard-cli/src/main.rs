//! callboard command-line tool
//!
//! Fetches the call list once and prints the dashboard views: statistics, the
//! filtered table, one call's transcript or the chart series.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

mod output;

use anyhow::{Context, Result, bail};
use callboard_client::{ApiClient, TokenStore};
use callboard_core::{CallId, Config, ResponseContract, init_logging, utils::display_offset};
use callboard_dashboard::{CallStore, DashboardView, FilterInputs, StatusFilter};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::{path::PathBuf, sync::Arc};
use tracing::info;

/// Command line interface for callboard
#[derive(Parser)]
#[command(
    name = "callboard",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inspect voice-agent call records from the terminal"
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Accepted response shape (overrides config)
    #[arg(long, value_name = "CONTRACT")]
    contract: Option<ResponseContract>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long)]
    log_format: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Output format of the views
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human readable tables
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Show aggregate statistics
    Stats,

    /// List calls passing the filters
    List {
        /// Status to keep, or "all"
        #[arg(short, long, default_value = "all")]
        status: String,

        /// Search phone, session id or call id
        #[arg(short = 'q', long, default_value = "")]
        search: String,
    },

    /// Show one call with its transcript
    Show {
        /// Call identifier
        #[arg(value_name = "ID")]
        id: CallId,
    },

    /// Show the chart series
    Charts,

    /// Manage the stored bearer token
    Token {
        /// Token subcommand
        #[command(subcommand)]
        action: TokenCommands,
    },

    /// Show the resolved configuration
    Config {
        /// Validate only, print nothing on success
        #[arg(long)]
        check: bool,
    },
}

/// Token management commands
#[derive(Subcommand)]
enum TokenCommands {
    /// Store a token
    Set {
        /// Bearer token
        #[arg(value_name = "TOKEN")]
        token: String,
    },

    /// Remove the stored token
    Clear,

    /// Show where the token is stored and whether one is present
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for development convenience)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = Config::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(base_url) = &cli.base_url {
        config.api.base_url.clone_from(base_url);
    }
    if let Some(contract) = cli.contract {
        config.api.contract = contract;
    }
    config.check().context("validating configuration")?;

    let (level, format) = log_settings(&cli, &config);
    init_logging(level, format)?;

    match cli.command {
        Commands::Stats => {
            let view = load_view(&config).await?;
            let stats = view.stats();
            emit(cli.format, &stats, || output::stats_table(&stats))
        }
        Commands::List { status, search } => {
            let view = load_view(&config).await?;
            view.set_filters(FilterInputs {
                status: StatusFilter::from(status.as_str()),
                search,
            });
            let calls = view.filtered_calls();
            let offset = display_offset(config.display.utc_offset_minutes);
            emit(cli.format, calls.as_ref(), || {
                output::calls_table(&calls, offset)
            })
        }
        Commands::Show { id } => {
            let view = load_view(&config).await?;
            let call = view.store().select_by_id(id)?;
            let offset = display_offset(config.display.utc_offset_minutes);
            emit(cli.format, &call, || output::call_detail(&call, offset))
        }
        Commands::Charts => {
            let view = load_view(&config).await?;
            let charts = view.charts();
            emit(cli.format, charts.as_ref(), || output::charts_text(&charts))
        }
        Commands::Token { action } => handle_token_command(action, &config),
        Commands::Config { check } => {
            if check {
                info!("Configuration is valid");
                return Ok(());
            }
            let rendered =
                toml::to_string_pretty(&config).context("serializing configuration")?;
            println!("{rendered}");
            Ok(())
        }
    }
}

/// Log level and format, command-line flags first, then configuration
fn log_settings<'a>(cli: &'a Cli, config: &'a Config) -> (&'a str, &'a str) {
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    let format = cli
        .log_format
        .as_deref()
        .unwrap_or(&config.logging.format);
    (level, format)
}

/// Fetch the call list once into a fresh view
async fn load_view(config: &Config) -> Result<DashboardView> {
    let client = ApiClient::from_config(config)?;
    let store = Arc::new(CallStore::new());
    store
        .load(&client)
        .await
        .with_context(|| format!("fetching calls from {}", client.calls_url()))?;
    Ok(DashboardView::new(store))
}

/// Print `value` as JSON or as the rendered table
fn emit<T: Serialize + ?Sized>(
    format: OutputFormat,
    value: &T,
    table: impl FnOnce() -> String,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => print!("{}", table()),
    }
    Ok(())
}

/// Handle token management commands
fn handle_token_command(action: TokenCommands, config: &Config) -> Result<()> {
    let tokens = TokenStore::from_config(&config.auth);

    match action {
        TokenCommands::Set { token } => {
            if token.trim().is_empty() {
                bail!("refusing to store an empty token");
            }
            let path = tokens.save(token.trim())?;
            println!("Token stored in {}", path.display());
        }
        TokenCommands::Clear => {
            if tokens.clear()? {
                println!("Token removed");
            } else {
                println!("No token was stored");
            }
        }
        TokenCommands::Show => {
            let location = tokens
                .path()
                .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());
            println!("Token file: {location}");
            match tokens.current()? {
                Some(token) => println!("Token:      present ({} chars)", token.chars().count()),
                None => println!("Token:      not set"),
            }
        }
    }

    Ok(())
}
