mod db;
mod discover;
mod refresh;

use clap::{CommandFactory, Parser, Subcommand};
use fanpulse_core::SweepResult;
use tracing_subscriber::EnvFilter;

use crate::db::DbCommands;
use crate::refresh::RefreshCommands;

#[derive(Debug, Parser)]
#[command(name = "fanpulse")]
#[command(about = "FanPulse live-stream discovery and metadata sync")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Crawl every active channel and upsert the streams it lists
    Discover {
        /// Print the sweep result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List one channel's streams without writing to the database
    Streams {
        /// Channel handle, with or without the leading `@`
        handle: String,
        /// Print the discovered streams as JSON
        #[arg(long)]
        json: bool,
    },
    /// Refresh stream titles and thumbnails from oEmbed
    Refresh {
        #[command(subcommand)]
        command: RefreshCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = fanpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            db::run_db_command(&pool, &config, command).await
        }
        Commands::Discover { json } => {
            let pool = connect(&config).await?;
            discover::run_discover(&pool, &config, json).await
        }
        Commands::Streams { handle, json } => discover::run_streams(&config, &handle, json).await,
        Commands::Refresh { command } => {
            let pool = connect(&config).await?;
            refresh::run_refresh(&pool, &config, command).await
        }
    }
}

async fn connect(config: &fanpulse_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = fanpulse_db::PoolConfig::from_app_config(config);
    let pool = fanpulse_db::connect_pool(config.require_database_url()?, pool_config).await?;
    Ok(pool)
}

/// Prints a sweep result as a short human summary or as JSON.
fn print_sweep_result(label: &str, result: &SweepResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    println!("{}", format_sweep_summary(label, result));
    for error in &result.errors {
        println!("  error: {error}");
    }
    if result.errors_dropped > 0 {
        println!("  ... {} more errors not shown", result.errors_dropped);
    }
    Ok(())
}

fn format_sweep_summary(label: &str, result: &SweepResult) -> String {
    format!(
        "{label}: total={} inserted={} updated={} failed={} channels_failed={}",
        result.total, result.inserted, result.updated, result.failed, result.channels_failed
    )
}
