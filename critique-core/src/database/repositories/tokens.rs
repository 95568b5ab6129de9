use async_trait::async_trait;
use chrono::{DateTime, Utc};
use critique_model::{User, UserId};
use sqlx::PgPool;

use super::UserRow;
use crate::database::ports::tokens::AccessTokensRepository;
use crate::error::{CoreError, Result};

/// PostgreSQL-backed implementation of the `AccessTokensRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresAccessTokensRepository {
    pool: PgPool,
}

impl PostgresAccessTokensRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AccessTokensRepository for PostgresAccessTokensRepository {
    async fn insert(
        &self,
        token_hash: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO access_tokens (token_hash, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(token_hash)
        .bind(user_id.to_uuid())
        .bind(expires_at)
        .execute(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to store access token: {e}"))
        })?;
        Ok(())
    }

    async fn find_user(&self, token_hash: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.username, u.email, u.first_name, u.last_name,
                   u.bio, u.role, u.is_superuser, u.is_staff, u.date_joined
            FROM access_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token_hash = $1 AND t.expires_at > NOW()
            "#,
        )
        .bind(token_hash)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to resolve access token: {e}"))
        })?;
        row.map(User::try_from).transpose()
    }

    async fn purge_expired(&self) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM access_tokens WHERE expires_at <= NOW()")
                .execute(self.pool())
                .await
                .map_err(|e| {
                    CoreError::Internal(format!(
                        "failed to purge expired tokens: {e}"
                    ))
                })?;
        Ok(result.rows_affected())
    }
}
