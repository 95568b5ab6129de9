use async_trait::async_trait;
use chrono::{DateTime, Utc};
use critique_model::{User, UserId};

use crate::error::Result;

#[async_trait]
pub trait AccessTokensRepository: Send + Sync {
    async fn insert(
        &self,
        token_hash: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Resolves a presented token hash to its owner, ignoring expired rows.
    async fn find_user(&self, token_hash: &str) -> Result<Option<User>>;

    /// Startup housekeeping; returns the number of rows removed.
    async fn purge_expired(&self) -> Result<u64>;
}
