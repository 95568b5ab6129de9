//! Request-level permission checks.
//!
//! Every handler funnels through [`require`] with a declared [`Capability`];
//! there is no per-handler role arithmetic. Roles are ordered
//! user < moderator < admin, and a superuser or staff account counts as
//! admin whatever its role field says.

use critique_model::{User, UserId};

use crate::errors::AppError;

/// What a request is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Open to everyone, including anonymous callers.
    Read,
    /// Mutating a specific piece of content; passes for its author, a
    /// moderator, or an admin.
    WriteOwn,
    /// Mutating anyone's content; moderator or admin.
    WriteAny,
    /// User management and catalog writes.
    Admin,
}

/// The single permission gate.
///
/// `author` is the owner of the targeted resource, where one exists; it is
/// only consulted for [`Capability::WriteOwn`].
pub fn require(
    caller: Option<&User>,
    capability: Capability,
    author: Option<UserId>,
) -> Result<(), AppError> {
    if capability == Capability::Read {
        return Ok(());
    }
    let user = caller
        .ok_or_else(|| AppError::unauthorized("authentication required"))?;

    let allowed = match capability {
        Capability::Read => true,
        Capability::WriteOwn => {
            author == Some(user.id) || user.is_moderator() || user.is_admin()
        }
        Capability::WriteAny => user.is_moderator() || user.is_admin(),
        Capability::Admin => user.is_admin(),
    };
    if allowed {
        Ok(())
    } else {
        Err(AppError::forbidden(match capability {
            Capability::Admin => "admin access required",
            _ => "you may only modify your own content",
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::Utc;
    use critique_model::Role;

    fn user(role: Role) -> User {
        User {
            id: UserId::new(),
            username: "someone".into(),
            email: "s@x.com".into(),
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            role,
            is_superuser: false,
            is_staff: false,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn reads_are_open_to_anonymous_callers() {
        assert!(require(None, Capability::Read, None).is_ok());
        let err = require(None, Capability::WriteOwn, None).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn admin_gate_honours_role_and_flags() {
        let plain = user(Role::User);
        let err =
            require(Some(&plain), Capability::Admin, None).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let admin = user(Role::Admin);
        assert!(require(Some(&admin), Capability::Admin, None).is_ok());

        let mut staff = user(Role::User);
        staff.is_superuser = true;
        assert!(require(Some(&staff), Capability::Admin, None).is_ok());
    }

    #[test]
    fn write_own_passes_for_author_and_staff() {
        let author_id = UserId::new();
        let stranger = user(Role::User);
        assert!(
            require(Some(&stranger), Capability::WriteOwn, Some(author_id))
                .is_err()
        );

        let moderator = user(Role::Moderator);
        assert!(
            require(Some(&moderator), Capability::WriteOwn, Some(author_id))
                .is_ok()
        );
        assert!(require(Some(&moderator), Capability::WriteAny, None).is_ok());

        let mut own = user(Role::User);
        own.id = author_id;
        assert!(
            require(Some(&own), Capability::WriteOwn, Some(author_id)).is_ok()
        );
    }
}
