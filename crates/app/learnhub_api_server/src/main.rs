//! LearnHub API server binary.
//!
//! Loads configuration from the environment (and `.env`), connects to
//! PostgreSQL, runs migrations and serves the API router.

use std::sync::Arc;

use clap::Parser;
use learnhub_api::config::ApiConfig;
use learnhub_core::auth::queries::PgAuthStore;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// CLI arguments for the API server. Unset options fall back to the
/// environment (see `ApiConfig::from_env`).
#[derive(Parser, Debug)]
#[command(name = "learnhub_api_server", about = "LearnHub API server")]
struct Args {
    /// Address to bind the HTTP listener (overrides `BIND_ADDR`).
    #[arg(long)]
    bind_addr: Option<String>,

    /// PostgreSQL connection URL (overrides `DATABASE_URL`).
    #[arg(long)]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    /// Do not run embedded migrations at startup.
    #[arg(long, default_value_t = false)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,learnhub_api=debug,learnhub_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    if let Some(bind_addr) = args.bind_addr {
        config.bind_addr = bind_addr;
    }
    if let Some(database_url) = args.database_url {
        config.pg_connection_url = database_url;
    }

    info!(
        bind_addr = %config.bind_addr,
        max_connections = args.max_connections,
        token_ttl_secs = config.token_ttl_secs,
        role_lookup_timeout_ms = config.role_lookup_timeout.as_millis() as u64,
        "starting learnhub_api_server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.pg_connection_url)
        .await?;

    if args.skip_migrations {
        info!("skipping database migrations");
    } else {
        info!("running database migrations");
        learnhub_api::migrate(&pool).await?;
    }

    let store = Arc::new(PgAuthStore::new(pool));
    let state = learnhub_api::AppState::new(store, config.clone());
    let app = learnhub_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
