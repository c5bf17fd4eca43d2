use account_service::{AccountService, AccountServiceConfig};
use clap::{Parser, Subcommand};
use common::db::{init_db_pool, run_migrations};
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Account Service CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set the log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Database URL, defaults to DATABASE_URL
    #[arg(short, long, global = true)]
    database_url: Option<String>,

    /// Commands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Print an account as JSON
    Show {
        /// Account ID
        id: Uuid,
    },
    /// Print the accounts of an owner as JSON, newest first
    Owner {
        /// Owner ID
        owner_id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Parse command line arguments
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("account_service={},common={}", cli.log_level, cli.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = AccountServiceConfig::from_env();
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }

    match cli.command {
        Commands::Migrate => {
            let pool = init_db_pool(&config.database_url, config.db_pool_size).await?;
            run_migrations(&pool).await?;
            info!("Migrations applied");
        }
        Commands::Show { id } => {
            let service = AccountService::with_config(&config).await?;
            let account = service.get_account(id).await?;
            println!("{}", serde_json::to_string_pretty(&account)?);
        }
        Commands::Owner { owner_id } => {
            let service = AccountService::with_config(&config).await?;
            let accounts = service.list_accounts_by_owner(owner_id).await?;
            println!("{}", serde_json::to_string_pretty(&accounts)?);
        }
    }

    Ok(())
}
