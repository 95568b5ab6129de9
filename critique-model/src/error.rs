use thiserror::Error;

/// Field-level validation failures shared by the API layer and the bulk
/// loader. Each variant knows which wire field it belongs to so handlers can
/// build structured error bodies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid characters in username: {0}")]
    InvalidUsername(String),

    #[error("username `{0}` is reserved and cannot be registered")]
    ReservedUsername(String),

    #[error("`{0}` is not a valid email address")]
    InvalidEmail(String),

    #[error("`{0}` is not a valid slug")]
    InvalidSlug(String),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("year {year} is later than the current year {current}")]
    YearInFuture { year: i32, current: i32 },

    #[error("score {0} is out of bounds (1..=10)")]
    ScoreOutOfRange(i16),

    #[error("unknown role: {0}")]
    UnknownRole(String),
}

impl ModelError {
    /// Wire field the error should be attached to in a validation response.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidUsername(_) | Self::ReservedUsername(_) => "username",
            Self::InvalidEmail(_) => "email",
            Self::InvalidSlug(_) => "slug",
            Self::TooLong { field, .. } | Self::Empty { field } => field,
            Self::YearInFuture { .. } => "year",
            Self::ScoreOutOfRange(_) => "score",
            Self::UnknownRole(_) => "role",
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
