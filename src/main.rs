use clap::{Parser, Subcommand};
use configuration::{load_config, Config};
use database::connection::{connect, run_migrations};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The main entry point for the catalog service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config)?;

    match cli.command {
        Commands::Serve => web_server::run_server(&config).await?,
        Commands::Migrate => handle_migrate(&config).await?,
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// An HTTP service for products and their categories.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml if present).
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server.
    Serve,
    /// Apply database migrations and exit.
    Migrate,
}

/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.level))?;
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn handle_migrate(config: &Config) -> anyhow::Result<()> {
    let db_pool = connect(&config.database).await?;
    run_migrations(&db_pool).await?;
    tracing::info!("Migrations complete.");
    Ok(())
}
