use async_trait::async_trait;
use chrono::{DateTime, Utc};
use critique_model::{Review, ReviewId, TitleId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::Page;
use crate::database::ports::feedback::{ReviewPatch, ReviewsRepository};
use crate::error::{CoreError, Result};

const REVIEW_SELECT: &str = r#"
SELECT r.id, r.title_id, r.text, r.score, r.pub_date,
       r.author_id, u.username AS author_username
FROM reviews r
JOIN users u ON u.id = r.author_id"#;

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    title_id: i64,
    text: String,
    score: i16,
    pub_date: DateTime<Utc>,
    author_id: Uuid,
    author_username: String,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: ReviewId(row.id),
            title_id: TitleId(row.title_id),
            text: row.text,
            author_username: row.author_username,
            author_id: UserId(row.author_id),
            score: row.score,
            pub_date: row.pub_date,
        }
    }
}

/// PostgreSQL-backed implementation of the `ReviewsRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresReviewsRepository {
    pool: PgPool,
}

impl PostgresReviewsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ReviewsRepository for PostgresReviewsRepository {
    async fn list_for_title(
        &self,
        title_id: TitleId,
        page: Page,
    ) -> Result<(Vec<Review>, i64)> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            r#"{REVIEW_SELECT}
            WHERE r.title_id = $1
            ORDER BY r.pub_date, r.id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(title_id.as_i64())
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to list reviews: {e}"))
        })?;

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reviews WHERE title_id = $1",
        )
        .bind(title_id.as_i64())
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to count reviews: {e}"))
        })?;

        Ok((rows.into_iter().map(Review::from).collect(), count))
    }

    async fn get(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "{REVIEW_SELECT} WHERE r.title_id = $1 AND r.id = $2"
        ))
        .bind(title_id.as_i64())
        .bind(review_id.as_i64())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to get review: {e}"))
        })?;
        Ok(row.map(Review::from))
    }

    async fn create(
        &self,
        title_id: TitleId,
        author_id: UserId,
        text: &str,
        score: i16,
    ) -> Result<Review> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO reviews (title_id, author_id, text, score)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(title_id.as_i64())
        .bind(author_id.to_uuid())
        .bind(text)
        .bind(score)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.constraint() == Some("reviews_title_author_key") {
                    return CoreError::Conflict(
                        "you have already reviewed this title".into(),
                    );
                }
                if db_err.constraint() == Some("reviews_score_check") {
                    return CoreError::validation(
                        "score",
                        format!("score {score} is out of bounds (1..=10)"),
                    );
                }
            }
            CoreError::Internal(format!("failed to create review: {e}"))
        })?;

        self.get(title_id, ReviewId(id)).await?.ok_or_else(|| {
            CoreError::Internal("created review vanished".into())
        })
    }

    async fn update(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
        patch: ReviewPatch,
    ) -> Result<Review> {
        let updated = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE reviews SET
                text = COALESCE($3, text),
                score = COALESCE($4, score)
            WHERE title_id = $1 AND id = $2
            RETURNING id
            "#,
        )
        .bind(title_id.as_i64())
        .bind(review_id.as_i64())
        .bind(patch.text)
        .bind(patch.score)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to update review: {e}"))
        })?;

        if updated.is_none() {
            return Err(CoreError::NotFound(format!(
                "review {review_id} not found"
            )));
        }
        self.get(title_id, review_id).await?.ok_or_else(|| {
            CoreError::Internal("updated review vanished".into())
        })
    }

    async fn delete(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM reviews WHERE title_id = $1 AND id = $2",
        )
        .bind(title_id.as_i64())
        .bind(review_id.as_i64())
        .execute(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to delete review: {e}"))
        })?;
        Ok(result.rows_affected() > 0)
    }
}
