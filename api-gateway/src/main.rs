//! API Gateway for the account service

use std::sync::Arc;

use account_service::{AccountService, PostgresAccountRepository};
use api_gateway::config::{AppConfig, StorageBackend};
use api_gateway::{router_with_log_level, AppState};
use clap::Parser;
use common::db::{init_db_pool, run_migrations};
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, error, info, Level};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, FmtSubscriber};

/// Account API server
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Listening address, overrides API_ADDR
    #[clap(short, long)]
    addr: Option<String>,

    /// Storage backend (memory or postgres), overrides STORAGE
    #[clap(short, long)]
    storage: Option<String>,

    /// Apply migrations before serving (postgres only)
    #[clap(long)]
    run_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Debug level when DEBUG=1 env var is set
    let debug_enabled = std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false);
    let log_level = if debug_enabled { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(FmtSpan::CLOSE)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    debug!("Debug logging enabled");

    let mut config = AppConfig::new()?;
    if let Some(addr) = args.addr {
        config.addr = addr;
    }
    if let Some(storage) = args.storage {
        config.storage = storage.parse()?;
    }
    config.run_migrations |= args.run_migrations;

    let account_service = match config.storage {
        StorageBackend::Memory => {
            info!("Using in-memory account storage");
            AccountService::new()
        }
        StorageBackend::Postgres => {
            let accounts = &config.accounts;
            let pool = init_db_pool(&accounts.database_url, accounts.db_pool_size).await?;
            if config.run_migrations {
                run_migrations(&pool).await?;
                info!("Migrations applied");
            }
            AccountService::from_repository(
                Arc::new(PostgresAccountRepository::from_pool(pool)),
                accounts.concurrency,
            )
        }
    };

    let state = Arc::new(AppState {
        account_service: Arc::new(account_service),
    });
    let app = router_with_log_level(state, log_level);

    let listener = TcpListener::bind(&config.addr).await?;
    info!("Listening on {}", config.addr);

    // Run until interrupt signal
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
