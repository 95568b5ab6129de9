use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{ids::UserId, role::Role};

/// A registered account.
///
/// Serializes to the administrative wire shape (username, email, names, bio,
/// role); internal identifiers and privilege flags never leave the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    #[serde(skip_serializing)]
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub is_superuser: bool,
    #[serde(skip_serializing)]
    pub is_staff: bool,
    #[serde(skip_serializing)]
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Admin capability is granted by role or by the superuser/staff flags.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.is_superuser || self.is_staff
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }
}
