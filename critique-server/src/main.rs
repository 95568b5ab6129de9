//! critique-server binary: parse flags, connect, migrate, serve.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use critique_core::Database;
use critique_server::{AppState, Config, build_app};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "critique-server")]
#[command(about = "REST API for reviews and ratings of creative works")]
struct Cli {
    /// Bind address, overrides SERVER_HOST
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overrides SERVER_PORT
    #[arg(long)]
    port: Option<u16>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

/// Interval between sweeps of expired access tokens.
const TOKEN_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.server_host = host;
    }
    if let Some(port) = cli.port {
        config.server_port = port;
    }
    if cli.database_url.is_some() {
        config.database_url = cli.database_url;
    }

    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL is not set")?;
    let database = Database::connect(&database_url).await?;
    database.migrate().await?;
    info!("database ready");

    let state = AppState::new(database.repositories(), config.clone());

    // Hourly sweep of expired access tokens.
    let purge_repos = state.repos.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(TOKEN_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            match purge_repos.access_tokens.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => info!(purged, "expired access tokens removed"),
                Err(e) => warn!("token purge failed: {e}"),
            }
        }
    });

    let app = build_app(state);
    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .context("invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to install shutdown handler: {e}");
        return;
    }
    info!("shutdown signal received");
}
