mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use today_core::SystemClock;

use commands::show::View;

#[derive(Parser)]
#[command(name = "today")]
#[command(about = "Show today's events from your calendar feeds")]
struct Cli {
    /// Read events from this ICS file instead of the cached feeds
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List today's events, one per line
    List,
    /// Draw today's events on an hourly timeline
    Table,
    /// Fetch every feed into the local cache
    Refresh,
    /// Add a feed URL
    Add { url: String },
    /// Remove a feed URL and its cached copy
    Remove { url: String },
    /// Show the configured feed URLs
    Urls,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::Level::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();
    let file = cli.file.as_deref();
    let clock = SystemClock;

    match cli.command {
        None => commands::show::run(View::Agenda, file, &clock),
        Some(Commands::List) => commands::show::run(View::List, file, &clock),
        Some(Commands::Table) => commands::show::run(View::Table, file, &clock),
        Some(Commands::Refresh) => commands::refresh::run().await,
        Some(Commands::Add { url }) => commands::add::run(&url),
        Some(Commands::Remove { url }) => commands::remove::run(&url),
        Some(Commands::Urls) => commands::urls::run(),
    }
}
