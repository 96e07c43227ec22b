mod import;
mod visibility;

use std::path::PathBuf;

use beatdb_core::DataVisibility;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "beatdb-cli")]
#[command(about = "BeatDB store directory command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import stores from a CSV file
    Import {
        /// Path to the CSV file
        file: PathBuf,
        /// Parse and report without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Apply pending database migrations
    Migrate,
    /// Show or change whether store data is visible to viewers
    Visibility {
        #[command(subcommand)]
        command: Option<VisibilityCommands>,
    },
}

#[derive(Debug, Subcommand)]
enum VisibilityCommands {
    /// Set the visibility flag
    Set {
        /// `visible` or `hidden`
        #[arg(value_parser = parse_visibility)]
        value: DataVisibility,
    },
}

fn parse_visibility(raw: &str) -> Result<DataVisibility, String> {
    raw.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Import {
            file,
            dry_run: true,
        }) => {
            let raw = read_csv_file(&file)?;
            import::run_dry_run(&raw)?;
        }
        Some(Commands::Import {
            file,
            dry_run: false,
        }) => {
            let raw = read_csv_file(&file)?;
            let pool = connect().await?;
            import::run_import(&pool, &raw).await?;
        }
        Some(Commands::Migrate) => {
            let pool = connect().await?;
            let applied = beatdb_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Some(Commands::Visibility { command: None }) => {
            let pool = connect().await?;
            visibility::run_show(&pool).await?;
        }
        Some(Commands::Visibility {
            command: Some(VisibilityCommands::Set { value }),
        }) => {
            let pool = connect().await?;
            visibility::run_set(&pool, value).await?;
        }
        None => println!("beatdb-cli: run with --help to list commands"),
    }

    Ok(())
}

fn read_csv_file(path: &std::path::Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))
}

/// Load configuration and open a pool sized from it.
async fn connect() -> anyhow::Result<sqlx::PgPool> {
    let config = beatdb_core::load_app_config()?;
    let pool_config = beatdb_db::PoolConfig::from_app_config(&config);
    let pool = beatdb_db::connect_pool(&config.database_url, pool_config).await?;
    tracing::debug!(env = %config.env, "connected to database");
    Ok(pool)
}
