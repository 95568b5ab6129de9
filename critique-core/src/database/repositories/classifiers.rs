//! Categories and genres are structurally identical classifiers; the SQL is
//! shared and each repository maps rows into its own domain type.

use async_trait::async_trait;
use critique_model::{Category, CategoryId, Genre, GenreId};
use sqlx::PgPool;

use crate::database::Page;
use crate::database::ports::catalog::{
    CategoriesRepository, GenresRepository,
};
use crate::error::{CoreError, Result};

#[derive(Debug, sqlx::FromRow)]
struct ClassifierRow {
    id: i64,
    name: String,
    slug: String,
}

async fn list_rows(
    pool: &PgPool,
    table: &str,
    search: Option<&str>,
    page: Page,
) -> Result<(Vec<ClassifierRow>, i64)> {
    let rows = sqlx::query_as::<_, ClassifierRow>(&format!(
        r#"
        SELECT id, name, slug FROM {table}
        WHERE $1::TEXT IS NULL OR name ILIKE '%' || $1 || '%'
        ORDER BY name, id
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(search)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        CoreError::Internal(format!("failed to list {table}: {e}"))
    })?;

    let count = sqlx::query_scalar::<_, i64>(&format!(
        r#"
        SELECT COUNT(*) FROM {table}
        WHERE $1::TEXT IS NULL OR name ILIKE '%' || $1 || '%'
        "#
    ))
    .bind(search)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        CoreError::Internal(format!("failed to count {table}: {e}"))
    })?;

    Ok((rows, count))
}

async fn insert_row(
    pool: &PgPool,
    table: &str,
    name: &str,
    slug: &str,
) -> Result<ClassifierRow> {
    sqlx::query_as::<_, ClassifierRow>(&format!(
        r#"
        INSERT INTO {table} (name, slug)
        VALUES ($1, $2)
        RETURNING id, name, slug
        "#
    ))
    .bind(name)
    .bind(slug)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let Some(db_err) = e.as_database_error() {
            if db_err.constraint() == Some(&format!("{table}_slug_key")[..]) {
                return CoreError::Conflict(format!(
                    "slug `{slug}` is already in use"
                ));
            }
        }
        CoreError::Internal(format!("failed to insert into {table}: {e}"))
    })
}

async fn get_row_by_slug(
    pool: &PgPool,
    table: &str,
    slug: &str,
) -> Result<Option<ClassifierRow>> {
    sqlx::query_as::<_, ClassifierRow>(&format!(
        "SELECT id, name, slug FROM {table} WHERE slug = $1"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        CoreError::Internal(format!("failed to get {table} by slug: {e}"))
    })
}

async fn delete_row_by_slug(
    pool: &PgPool,
    table: &str,
    slug: &str,
) -> Result<bool> {
    let result =
        sqlx::query(&format!("DELETE FROM {table} WHERE slug = $1"))
            .bind(slug)
            .execute(pool)
            .await
            .map_err(|e| {
                CoreError::Internal(format!(
                    "failed to delete from {table}: {e}"
                ))
            })?;
    Ok(result.rows_affected() > 0)
}

/// PostgreSQL-backed implementation of the `CategoriesRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresCategoriesRepository {
    pool: PgPool,
}

impl PostgresCategoriesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<ClassifierRow> for Category {
    fn from(row: ClassifierRow) -> Self {
        Category {
            id: CategoryId(row.id),
            name: row.name,
            slug: row.slug,
        }
    }
}

#[async_trait]
impl CategoriesRepository for PostgresCategoriesRepository {
    async fn list(
        &self,
        search: Option<&str>,
        page: Page,
    ) -> Result<(Vec<Category>, i64)> {
        let (rows, count) =
            list_rows(&self.pool, "categories", search, page).await?;
        Ok((rows.into_iter().map(Category::from).collect(), count))
    }

    async fn create(&self, name: &str, slug: &str) -> Result<Category> {
        insert_row(&self.pool, "categories", name, slug)
            .await
            .map(Category::from)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        Ok(get_row_by_slug(&self.pool, "categories", slug)
            .await?
            .map(Category::from))
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool> {
        delete_row_by_slug(&self.pool, "categories", slug).await
    }
}

/// PostgreSQL-backed implementation of the `GenresRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresGenresRepository {
    pool: PgPool,
}

impl PostgresGenresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<ClassifierRow> for Genre {
    fn from(row: ClassifierRow) -> Self {
        Genre {
            id: GenreId(row.id),
            name: row.name,
            slug: row.slug,
        }
    }
}

#[async_trait]
impl GenresRepository for PostgresGenresRepository {
    async fn list(
        &self,
        search: Option<&str>,
        page: Page,
    ) -> Result<(Vec<Genre>, i64)> {
        let (rows, count) =
            list_rows(&self.pool, "genres", search, page).await?;
        Ok((rows.into_iter().map(Genre::from).collect(), count))
    }

    async fn create(&self, name: &str, slug: &str) -> Result<Genre> {
        insert_row(&self.pool, "genres", name, slug)
            .await
            .map(Genre::from)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Genre>> {
        Ok(get_row_by_slug(&self.pool, "genres", slug)
            .await?
            .map(Genre::from))
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool> {
        delete_row_by_slug(&self.pool, "genres", slug).await
    }
}
