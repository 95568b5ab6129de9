//! Field validators shared by the API layer and the bulk loader.

use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use regex::Regex;

use crate::error::{ModelError, Result};

pub const MAX_USERNAME_LEN: usize = 150;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_NAME_LEN: usize = 256;
pub const MAX_SLUG_LEN: usize = 50;
pub const MAX_COMMENT_LEN: usize = 1000;
pub const MIN_SCORE: i16 = 1;
pub const MAX_SCORE: i16 = 10;

/// `me` aliases the caller's own profile endpoint and can never be a
/// registered username.
pub const RESERVED_USERNAME: &str = "me";

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});

pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(ModelError::Empty { field: "username" });
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ModelError::TooLong {
            field: "username",
            max: MAX_USERNAME_LEN,
        });
    }
    if !USERNAME_RE.is_match(username) {
        // Report exactly the characters the pattern rejected.
        let rejected: String = username
            .chars()
            .filter(|c| !USERNAME_RE.is_match(&c.to_string()))
            .collect();
        return Err(ModelError::InvalidUsername(rejected));
    }
    if username.eq_ignore_ascii_case(RESERVED_USERNAME) {
        return Err(ModelError::ReservedUsername(username.to_string()));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<()> {
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(ModelError::TooLong {
            field: "email",
            max: MAX_EMAIL_LEN,
        });
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ModelError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() {
        return Err(ModelError::Empty { field: "slug" });
    }
    if slug.chars().count() > MAX_SLUG_LEN {
        return Err(ModelError::TooLong {
            field: "slug",
            max: MAX_SLUG_LEN,
        });
    }
    if !SLUG_RE.is_match(slug) {
        return Err(ModelError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

/// Display names for categories, genres and titles share one length cap.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ModelError::Empty { field: "name" });
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ModelError::TooLong {
            field: "name",
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

/// A title's release year must not lie in the future.
pub fn validate_year(year: i32) -> Result<()> {
    let current = Utc::now().year();
    if year > current {
        return Err(ModelError::YearInFuture { year, current });
    }
    Ok(())
}

pub fn validate_score(score: i16) -> Result<()> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(ModelError::ScoreOutOfRange(score));
    }
    Ok(())
}

pub fn validate_comment_text(text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(ModelError::Empty { field: "text" });
    }
    if text.chars().count() > MAX_COMMENT_LEN {
        return Err(ModelError::TooLong {
            field: "text",
            max: MAX_COMMENT_LEN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_standard_usernames() {
        for name in ["bob", "a.b-c_d", "user@host", "plus+name", "Алёна"] {
            assert!(validate_username(name).is_ok(), "rejected {name}");
        }
    }

    #[test]
    fn rejects_bad_username_characters() {
        let err = validate_username("bad name!").unwrap_err();
        match err {
            ModelError::InvalidUsername(rejected) => {
                assert!(rejected.contains(' '));
                assert!(rejected.contains('!'));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_reserved_username_any_case() {
        assert!(matches!(
            validate_username("me"),
            Err(ModelError::ReservedUsername(_))
        ));
        assert!(matches!(
            validate_username("ME"),
            Err(ModelError::ReservedUsername(_))
        ));
    }

    #[test]
    fn rejects_overlong_username() {
        let long = "a".repeat(MAX_USERNAME_LEN + 1);
        assert!(matches!(
            validate_username(&long),
            Err(ModelError::TooLong { field: "username", .. })
        ));
    }

    #[test]
    fn validates_email_shape() {
        assert!(validate_email("b@x.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a b@x.com").is_err());
    }

    #[test]
    fn validates_slugs() {
        assert!(validate_slug("films").is_ok());
        assert!(validate_slug("sci-fi_2").is_ok());
        assert!(validate_slug("bad slug").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn year_must_not_exceed_current() {
        let current = Utc::now().year();
        assert!(validate_year(current).is_ok());
        assert!(validate_year(1895).is_ok());
        assert!(matches!(
            validate_year(current + 1),
            Err(ModelError::YearInFuture { .. })
        ));
    }

    #[test]
    fn score_bounds_are_inclusive() {
        assert!(validate_score(1).is_ok());
        assert!(validate_score(10).is_ok());
        assert!(validate_score(0).is_err());
        assert!(validate_score(11).is_err());
    }

    #[test]
    fn comment_text_is_bounded() {
        assert!(validate_comment_text("ok").is_ok());
        assert!(validate_comment_text("").is_err());
        let long = "x".repeat(MAX_COMMENT_LEN + 1);
        assert!(validate_comment_text(&long).is_err());
    }
}
