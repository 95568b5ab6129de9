use std::collections::HashMap;

use async_trait::async_trait;
use critique_model::{Category, CategoryId, Genre, GenreId, Title, TitleId};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::Page;
use crate::database::ports::catalog::{
    NewTitle, TitleFilter, TitlePatch, TitlesRepository,
};
use crate::error::{CoreError, Result};

const TITLE_SELECT: &str = r#"
SELECT t.id, t.name, t.year, t.description,
       c.id AS category_id, c.name AS category_name, c.slug AS category_slug,
       (SELECT AVG(r.score)::FLOAT8 FROM reviews r WHERE r.title_id = t.id)
           AS rating
FROM titles t
JOIN categories c ON c.id = t.category_id
WHERE 1 = 1"#;

const TITLE_COUNT: &str = r#"
SELECT COUNT(*)
FROM titles t
JOIN categories c ON c.id = t.category_id
WHERE 1 = 1"#;

#[derive(Debug, sqlx::FromRow)]
struct TitleRow {
    id: i64,
    name: String,
    year: i32,
    description: Option<String>,
    category_id: i64,
    category_name: String,
    category_slug: String,
    rating: Option<f64>,
}

impl TitleRow {
    fn into_title(self, genre: Vec<Genre>) -> Title {
        Title {
            id: TitleId(self.id),
            name: self.name,
            year: self.year,
            rating: self.rating,
            description: self.description,
            genre,
            category: Category {
                id: CategoryId(self.category_id),
                name: self.category_name,
                slug: self.category_slug,
            },
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TitleGenreRow {
    title_id: i64,
    id: i64,
    name: String,
    slug: String,
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &TitleFilter) {
    if let Some(category) = &filter.category {
        builder.push(" AND c.slug = ");
        builder.push_bind(category.clone());
    }
    if let Some(genre) = &filter.genre {
        builder.push(
            " AND EXISTS (SELECT 1 FROM title_genres tg \
             JOIN genres g ON g.id = tg.genre_id \
             WHERE tg.title_id = t.id AND g.slug = ",
        );
        builder.push_bind(genre.clone());
        builder.push(")");
    }
    if let Some(year) = filter.year {
        builder.push(" AND t.year = ");
        builder.push_bind(year);
    }
    if let Some(name) = &filter.name {
        builder.push(" AND t.name ILIKE ");
        builder.push_bind(format!("%{name}%"));
    }
}

/// PostgreSQL-backed implementation of the `TitlesRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresTitlesRepository {
    pool: PgPool,
}

impl PostgresTitlesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Genres for a batch of titles, keyed by title id.
    async fn genres_for(
        &self,
        title_ids: Vec<i64>,
    ) -> Result<HashMap<i64, Vec<Genre>>> {
        let rows = sqlx::query_as::<_, TitleGenreRow>(
            r#"
            SELECT tg.title_id, g.id, g.name, g.slug
            FROM title_genres tg
            JOIN genres g ON g.id = tg.genre_id
            WHERE tg.title_id = ANY($1)
            ORDER BY g.slug
            "#,
        )
        .bind(title_ids)
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to load title genres: {e}"))
        })?;

        let mut grouped: HashMap<i64, Vec<Genre>> = HashMap::new();
        for row in rows {
            grouped.entry(row.title_id).or_default().push(Genre {
                id: GenreId(row.id),
                name: row.name,
                slug: row.slug,
            });
        }
        Ok(grouped)
    }

    async fn resolve_category(
        tx: &mut sqlx::PgConnection,
        slug: &str,
    ) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT id FROM categories WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(tx)
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to resolve category: {e}"))
        })?
        .ok_or_else(|| {
            CoreError::validation(
                "category",
                format!("category with slug `{slug}` does not exist"),
            )
        })
    }

    async fn replace_genres(
        tx: &mut sqlx::PgConnection,
        title_id: i64,
        slugs: &[String],
    ) -> Result<()> {
        sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
            .bind(title_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                CoreError::Internal(format!(
                    "failed to clear title genres: {e}"
                ))
            })?;

        for slug in slugs {
            let genre_id = sqlx::query_scalar::<_, i64>(
                "SELECT id FROM genres WHERE slug = $1",
            )
            .bind(slug)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                CoreError::Internal(format!("failed to resolve genre: {e}"))
            })?
            .ok_or_else(|| {
                CoreError::validation(
                    "genre",
                    format!("genre with slug `{slug}` does not exist"),
                )
            })?;

            // Repeated slugs in the payload collapse onto the unique pair.
            sqlx::query(
                r#"
                INSERT INTO title_genres (title_id, genre_id)
                VALUES ($1, $2)
                ON CONFLICT (title_id, genre_id) DO NOTHING
                "#,
            )
            .bind(title_id)
            .bind(genre_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                CoreError::Internal(format!(
                    "failed to attach genre to title: {e}"
                ))
            })?;
        }
        Ok(())
    }

    async fn require(&self, id: TitleId) -> Result<Title> {
        self.get(id).await?.ok_or_else(|| {
            CoreError::NotFound(format!("title {id} not found"))
        })
    }
}

#[async_trait]
impl TitlesRepository for PostgresTitlesRepository {
    async fn list(
        &self,
        filter: &TitleFilter,
        page: Page,
    ) -> Result<(Vec<Title>, i64)> {
        let mut builder = QueryBuilder::new(TITLE_SELECT);
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY t.name, t.id LIMIT ");
        builder.push_bind(page.limit);
        builder.push(" OFFSET ");
        builder.push_bind(page.offset);

        let rows = builder
            .build_query_as::<TitleRow>()
            .fetch_all(self.pool())
            .await
            .map_err(|e| {
                CoreError::Internal(format!("failed to list titles: {e}"))
            })?;

        let mut count_builder = QueryBuilder::new(TITLE_COUNT);
        push_filters(&mut count_builder, filter);
        let count = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(|e| {
                CoreError::Internal(format!("failed to count titles: {e}"))
            })?;

        let mut genres = self
            .genres_for(rows.iter().map(|row| row.id).collect())
            .await?;
        let titles = rows
            .into_iter()
            .map(|row| {
                let genre = genres.remove(&row.id).unwrap_or_default();
                row.into_title(genre)
            })
            .collect();
        Ok((titles, count))
    }

    async fn get(&self, id: TitleId) -> Result<Option<Title>> {
        let mut builder = QueryBuilder::new(TITLE_SELECT);
        builder.push(" AND t.id = ");
        builder.push_bind(id.as_i64());

        let row = builder
            .build_query_as::<TitleRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(|e| {
                CoreError::Internal(format!("failed to get title: {e}"))
            })?;

        match row {
            Some(row) => {
                let mut genres = self.genres_for(vec![row.id]).await?;
                let genre = genres.remove(&row.id).unwrap_or_default();
                Ok(Some(row.into_title(genre)))
            }
            None => Ok(None),
        }
    }

    async fn exists(&self, id: TitleId) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM titles WHERE id = $1)",
        )
        .bind(id.as_i64())
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to check title: {e}"))
        })
    }

    async fn create(&self, new_title: NewTitle) -> Result<Title> {
        if new_title.genre.is_empty() {
            return Err(CoreError::validation(
                "genre",
                "at least one genre is required",
            ));
        }

        let mut tx = self.pool().begin().await.map_err(|e| {
            CoreError::Internal(format!("failed to start transaction: {e}"))
        })?;

        let category_id =
            Self::resolve_category(&mut tx, &new_title.category).await?;

        let title_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO titles (name, year, description, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&new_title.name)
        .bind(new_title.year)
        .bind(&new_title.description)
        .bind(category_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to insert title: {e}"))
        })?;

        Self::replace_genres(&mut tx, title_id, &new_title.genre).await?;

        tx.commit().await.map_err(|e| {
            CoreError::Internal(format!("failed to commit transaction: {e}"))
        })?;

        self.require(TitleId(title_id)).await
    }

    async fn update(&self, id: TitleId, patch: TitlePatch) -> Result<Title> {
        if let Some(genre) = &patch.genre {
            if genre.is_empty() {
                return Err(CoreError::validation(
                    "genre",
                    "at least one genre is required",
                ));
            }
        }

        let mut tx = self.pool().begin().await.map_err(|e| {
            CoreError::Internal(format!("failed to start transaction: {e}"))
        })?;

        let category_id = match &patch.category {
            Some(slug) => Some(Self::resolve_category(&mut tx, slug).await?),
            None => None,
        };

        let updated = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE titles SET
                name = COALESCE($2, name),
                year = COALESCE($3, year),
                description = COALESCE($4, description),
                category_id = COALESCE($5, category_id)
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id.as_i64())
        .bind(patch.name)
        .bind(patch.year)
        .bind(patch.description)
        .bind(category_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to update title: {e}"))
        })?;

        if updated.is_none() {
            return Err(CoreError::NotFound(format!("title {id} not found")));
        }

        if let Some(genre) = &patch.genre {
            Self::replace_genres(&mut tx, id.as_i64(), genre).await?;
        }

        tx.commit().await.map_err(|e| {
            CoreError::Internal(format!("failed to commit transaction: {e}"))
        })?;

        self.require(id).await
    }

    async fn delete(&self, id: TitleId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id.as_i64())
            .execute(self.pool())
            .await
            .map_err(|e| {
                CoreError::Internal(format!("failed to delete title: {e}"))
            })?;
        Ok(result.rows_affected() > 0)
    }
}
