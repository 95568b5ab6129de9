use async_trait::async_trait;
use critique_model::{Role, User, UserId};

use crate::database::Page;
use crate::error::Result;

/// Input for administrative user creation.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl NewUser {
    /// The self-service signup shape: username and email only, everything
    /// else defaulted.
    pub fn signup(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            role: Role::User,
        }
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Signup semantics: returns the existing account when the exact
    /// (username, email) pair is already registered, creates it when both
    /// are free, and reports a conflict when either is taken by someone
    /// else. Races between the lookup and the insert are settled by the
    /// unique constraints.
    async fn get_or_create(&self, username: &str, email: &str) -> Result<User>;

    async fn create(&self, new_user: NewUser) -> Result<User>;

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Paginated listing, optionally narrowed to usernames containing
    /// `search` (case-insensitive). Returns the page and the total count.
    async fn list(
        &self,
        search: Option<&str>,
        page: Page,
    ) -> Result<(Vec<User>, i64)>;

    async fn update(&self, id: UserId, patch: UserPatch) -> Result<User>;

    async fn delete_by_username(&self, username: &str) -> Result<bool>;

    async fn store_confirmation_code_hash(
        &self,
        id: UserId,
        hash: &str,
    ) -> Result<()>;

    async fn confirmation_code_hash(&self, id: UserId)
    -> Result<Option<String>>;

    /// Invalidates the outstanding code; called after a successful token
    /// exchange so codes are single-use.
    async fn clear_confirmation_code(&self, id: UserId) -> Result<()>;
}
