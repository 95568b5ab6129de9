//! Database access: an explicit, injected store handle plus one repository
//! port per aggregate. Handlers never touch the pool directly.

pub mod ports;
pub mod repositories;

use std::fmt;
use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::error::{CoreError, Result};
use ports::{
    AccessTokensRepository, CategoriesRepository, CommentsRepository,
    GenresRepository, ReviewsRepository, TitlesRepository, UsersRepository,
};
use repositories::{
    PostgresAccessTokensRepository, PostgresCategoriesRepository,
    PostgresCommentsRepository, PostgresGenresRepository,
    PostgresReviewsRepository, PostgresTitlesRepository,
    PostgresUsersRepository,
};

/// Limit/offset window for collection queries. Callers are expected to cap
/// the limit before building one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }
}

/// Connection handle for the primary PostgreSQL database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(16)
            .connect(database_url)
            .await
            .map_err(|e| {
                CoreError::Internal(format!(
                    "failed to connect to PostgreSQL: {e}"
                ))
            })?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        crate::MIGRATOR.run(&self.pool).await.map_err(|e| {
            CoreError::Internal(format!("failed to run migrations: {e}"))
        })?;
        info!("database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn repositories(&self) -> Repositories {
        Repositories::postgres(self.pool.clone())
    }
}

/// All repository ports behind one injectable handle, so handlers and tests
/// share a single wiring point.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UsersRepository>,
    pub access_tokens: Arc<dyn AccessTokensRepository>,
    pub categories: Arc<dyn CategoriesRepository>,
    pub genres: Arc<dyn GenresRepository>,
    pub titles: Arc<dyn TitlesRepository>,
    pub reviews: Arc<dyn ReviewsRepository>,
    pub comments: Arc<dyn CommentsRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUsersRepository::new(pool.clone())),
            access_tokens: Arc::new(PostgresAccessTokensRepository::new(
                pool.clone(),
            )),
            categories: Arc::new(PostgresCategoriesRepository::new(
                pool.clone(),
            )),
            genres: Arc::new(PostgresGenresRepository::new(pool.clone())),
            titles: Arc::new(PostgresTitlesRepository::new(pool.clone())),
            reviews: Arc::new(PostgresReviewsRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentsRepository::new(pool)),
        }
    }
}

impl fmt::Debug for Repositories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
