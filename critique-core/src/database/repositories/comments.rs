use async_trait::async_trait;
use chrono::{DateTime, Utc};
use critique_model::{Comment, CommentId, ReviewId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::Page;
use crate::database::ports::feedback::CommentsRepository;
use crate::error::{CoreError, Result};

const COMMENT_SELECT: &str = r#"
SELECT c.id, c.review_id, c.text, c.pub_date,
       c.author_id, u.username AS author_username
FROM comments c
JOIN users u ON u.id = c.author_id"#;

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    review_id: i64,
    text: String,
    pub_date: DateTime<Utc>,
    author_id: Uuid,
    author_username: String,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: CommentId(row.id),
            review_id: ReviewId(row.review_id),
            text: row.text,
            author_username: row.author_username,
            author_id: UserId(row.author_id),
            pub_date: row.pub_date,
        }
    }
}

/// PostgreSQL-backed implementation of the `CommentsRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresCommentsRepository {
    pool: PgPool,
}

impl PostgresCommentsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CommentsRepository for PostgresCommentsRepository {
    async fn list_for_review(
        &self,
        review_id: ReviewId,
        page: Page,
    ) -> Result<(Vec<Comment>, i64)> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            r#"{COMMENT_SELECT}
            WHERE c.review_id = $1
            ORDER BY c.pub_date DESC, c.id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(review_id.as_i64())
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to list comments: {e}"))
        })?;

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM comments WHERE review_id = $1",
        )
        .bind(review_id.as_i64())
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to count comments: {e}"))
        })?;

        Ok((rows.into_iter().map(Comment::from).collect(), count))
    }

    async fn get(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "{COMMENT_SELECT} WHERE c.review_id = $1 AND c.id = $2"
        ))
        .bind(review_id.as_i64())
        .bind(comment_id.as_i64())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to get comment: {e}"))
        })?;
        Ok(row.map(Comment::from))
    }

    async fn create(
        &self,
        review_id: ReviewId,
        author_id: UserId,
        text: &str,
    ) -> Result<Comment> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO comments (review_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(review_id.as_i64())
        .bind(author_id.to_uuid())
        .bind(text)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to create comment: {e}"))
        })?;

        self.get(review_id, CommentId(id)).await?.ok_or_else(|| {
            CoreError::Internal("created comment vanished".into())
        })
    }

    async fn update(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
        text: &str,
    ) -> Result<Comment> {
        let updated = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE comments SET text = $3
            WHERE review_id = $1 AND id = $2
            RETURNING id
            "#,
        )
        .bind(review_id.as_i64())
        .bind(comment_id.as_i64())
        .bind(text)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to update comment: {e}"))
        })?;

        if updated.is_none() {
            return Err(CoreError::NotFound(format!(
                "comment {comment_id} not found"
            )));
        }
        self.get(review_id, comment_id).await?.ok_or_else(|| {
            CoreError::Internal("updated comment vanished".into())
        })
    }

    async fn delete(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM comments WHERE review_id = $1 AND id = $2",
        )
        .bind(review_id.as_i64())
        .bind(comment_id.as_i64())
        .execute(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to delete comment: {e}"))
        })?;
        Ok(result.rows_affected() > 0)
    }
}
