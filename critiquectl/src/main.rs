//! critiquectl: operational companion to critique-server.
//!
//! Runs against the same database the server uses; nothing here goes
//! through HTTP.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use critique_core::database::ports::UserPatch;
use critique_core::{Database, ingest};
use critique_model::{Role, validate};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "critiquectl")]
#[command(about = "Admin tooling for the critique review platform")]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending schema migrations
    Migrate,

    /// Bulk-load a CSV data directory
    LoadData {
        /// Directory holding category.csv, genre.csv, titles.csv,
        /// genre_title.csv, users.csv, review.csv, and comments.csv
        #[arg(long, default_value = "static/data")]
        data_dir: PathBuf,
    },

    /// Create an account with the admin role, or promote an existing one
    CreateAdmin {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = cli
        .database_url
        .context("DATABASE_URL is not set; pass --database-url")?;
    let database = Database::connect(&database_url).await?;

    match cli.command {
        Command::Migrate => {
            database.migrate().await?;
            info!("migrations applied");
        }
        Command::LoadData { data_dir } => {
            database.migrate().await?;
            let report =
                ingest::load_data_dir(database.pool(), &data_dir).await?;
            for file in &report.files {
                info!(
                    file = file.file,
                    loaded = file.loaded,
                    skipped = file.skipped,
                    "processed"
                );
            }
            info!(
                loaded = report.total_loaded(),
                skipped = report.total_skipped(),
                "load complete"
            );
        }
        Command::CreateAdmin { username, email } => {
            validate::validate_username(&username)?;
            validate::validate_email(&email)?;
            let repos = database.repositories();
            let user = repos.users.get_or_create(&username, &email).await?;
            let user = repos
                .users
                .update(
                    user.id,
                    UserPatch {
                        role: Some(Role::Admin),
                        ..Default::default()
                    },
                )
                .await?;
            info!(username = %user.username, "admin account ready");
        }
    }
    Ok(())
}
