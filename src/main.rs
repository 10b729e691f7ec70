use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod adapter;
mod collect;
mod error;
mod init;
mod items;
mod output;
mod settings;
mod sources;
mod status;
mod store;
mod telemetry;
mod util;

use store::Store;

#[derive(Parser)]
#[command(name = "brief", about = "Daily brief content collector")]
struct Cli {
    /// SQLite DSN [env: DATABASE_URL]
    #[arg(global = true, long)]
    db: Option<String>,
    /// Sources YAML file [env: BRIEF_SOURCES]
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and apply migrations
    Init(init::InitCmd),
    /// Fetch sources and store new items
    Collect(collect::CollectCmd),
    /// Per-source health from the run history
    Status(status::StatusCmd),
    /// List configured sources
    Sources(sources::SourcesCmd),
    /// Items in a time window
    Items(items::ItemsCmd),
    /// One item by fingerprint
    Item(items::ItemCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // stderr logging. Respects RUST_LOG and BRIEF_LOG_FORMAT
    telemetry::config::init_tracing();

    let dsn = cli
        .db
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| settings::DEFAULT_DSN.to_string());
    let sources_path = cli
        .config
        .or_else(|| env::var("BRIEF_SOURCES").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(settings::DEFAULT_SOURCES));

    match cli.command {
        Commands::Init(args) => init::run(&dsn, &sources_path, args).await?,
        Commands::Collect(args) => {
            let cfg = settings::Settings::from_env()?;
            let srcs = sources::load_sources(&sources_path)?;
            collect::run(&open_store(&dsn).await?, &srcs, &cfg, args).await?
        }
        Commands::Status(args) => {
            let srcs = sources::load_sources(&sources_path)?;
            status::run(&open_store(&dsn).await?, &srcs, args).await?
        }
        Commands::Sources(args) => {
            let srcs = sources::load_sources(&sources_path)?;
            sources::run(&open_store(&dsn).await?, &srcs, args).await?
        }
        Commands::Items(args) => items::run_window(&open_store(&dsn).await?, args).await?,
        Commands::Item(args) => items::run_lookup(&open_store(&dsn).await?, args).await?,
    }

    Ok(())
}

async fn open_store(dsn: &str) -> Result<Store> {
    Store::open(dsn).await.with_context(|| format!("opening {dsn}"))
}
