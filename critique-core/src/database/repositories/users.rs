use async_trait::async_trait;
use chrono::{DateTime, Utc};
use critique_model::{User, UserId};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::database::Page;
use crate::database::ports::users::{NewUser, UserPatch, UsersRepository};
use crate::error::{CoreError, Result};

pub(crate) const USER_COLUMNS: &str = "id, username, email, first_name, \
     last_name, bio, role, is_superuser, is_staff, date_joined";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: String,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = CoreError;

    fn try_from(row: UserRow) -> Result<Self> {
        let role = row.role.parse().map_err(|_| {
            CoreError::Internal(format!(
                "unknown role `{}` stored for user {}",
                row.role, row.id
            ))
        })?;
        Ok(User {
            id: UserId(row.id),
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            bio: row.bio,
            role,
            is_superuser: row.is_superuser,
            is_staff: row.is_staff,
            date_joined: row.date_joined,
        })
    }
}

/// Maps a unique-constraint violation on the users table to the domain
/// conflict it represents, falling back to an internal error.
fn map_user_insert_error(e: sqlx::Error, action: &str) -> CoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.constraint() == Some("users_username_key") {
            return CoreError::Conflict("username is already taken".into());
        }
        if db_err.constraint() == Some("users_email_key") {
            return CoreError::Conflict("email is already taken".into());
        }
    }
    CoreError::Internal(format!("failed to {action}: {e}"))
}

/// PostgreSQL-backed implementation of the `UsersRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresUsersRepository {
    pool: PgPool,
}

impl PostgresUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to get user by email: {e}"))
        })?;
        row.map(User::try_from).transpose()
    }

    async fn insert(&self, id: UserId, new_user: &NewUser) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (
                id, username, email, first_name, last_name, bio, role
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id.to_uuid())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.bio)
        .bind(new_user.role.as_str())
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_user_insert_error(e, "create user"))?;

        info!("created user: {} ({})", new_user.username, id);
        row.try_into()
    }
}

#[async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn get_or_create(&self, username: &str, email: &str) -> Result<User> {
        if let Some(user) = self.get_by_username(username).await? {
            if user.email == email {
                return Ok(user);
            }
            return Err(CoreError::Conflict(
                "username is already taken".into(),
            ));
        }
        if self.get_by_email(email).await?.is_some() {
            return Err(CoreError::Conflict("email is already taken".into()));
        }
        // A concurrent signup can still win the insert; the unique
        // constraints turn that into the same conflict.
        self.insert(UserId::new(), &NewUser::signup(username, email))
            .await
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        self.insert(UserId::new(), &new_user).await
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.to_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to get user by id: {e}"))
        })?;
        row.map(User::try_from).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to get user by username: {e}"))
        })?;
        row.map(User::try_from).transpose()
    }

    async fn list(
        &self,
        search: Option<&str>,
        page: Page,
    ) -> Result<(Vec<User>, i64)> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE $1::TEXT IS NULL OR username ILIKE '%' || $1 || '%'
            ORDER BY username
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(search)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to list users: {e}"))
        })?;

        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM users
            WHERE $1::TEXT IS NULL OR username ILIKE '%' || $1 || '%'
            "#,
        )
        .bind(search)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("failed to count users: {e}"))
        })?;

        let users = rows
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok((users, count))
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                bio = COALESCE($6, bio),
                role = COALESCE($7, role)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id.to_uuid())
        .bind(patch.username)
        .bind(patch.email)
        .bind(patch.first_name)
        .bind(patch.last_name)
        .bind(patch.bio)
        .bind(patch.role.map(|role| role.as_str().to_string()))
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_user_insert_error(e, "update user"))?;

        row.ok_or_else(|| CoreError::NotFound("user not found".into()))?
            .try_into()
    }

    async fn delete_by_username(&self, username: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(self.pool())
            .await
            .map_err(|e| {
                CoreError::Internal(format!("failed to delete user: {e}"))
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn store_confirmation_code_hash(
        &self,
        id: UserId,
        hash: &str,
    ) -> Result<()> {
        sqlx::query("UPDATE users SET confirmation_code_hash = $2 WHERE id = $1")
            .bind(id.to_uuid())
            .bind(hash)
            .execute(self.pool())
            .await
            .map_err(|e| {
                CoreError::Internal(format!(
                    "failed to store confirmation code: {e}"
                ))
            })?;
        Ok(())
    }

    async fn confirmation_code_hash(
        &self,
        id: UserId,
    ) -> Result<Option<String>> {
        let hash = sqlx::query_scalar::<_, Option<String>>(
            "SELECT confirmation_code_hash FROM users WHERE id = $1",
        )
        .bind(id.to_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!(
                "failed to load confirmation code: {e}"
            ))
        })?;
        Ok(hash.flatten())
    }

    async fn clear_confirmation_code(&self, id: UserId) -> Result<()> {
        sqlx::query(
            "UPDATE users SET confirmation_code_hash = NULL WHERE id = $1",
        )
        .bind(id.to_uuid())
        .execute(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!(
                "failed to clear confirmation code: {e}"
            ))
        })?;
        Ok(())
    }
}
