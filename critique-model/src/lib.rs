//! Core data model definitions shared across critique crates.
#![allow(missing_docs)]

pub mod catalog;
pub mod error;
pub mod feedback;
pub mod ids;
pub mod role;
pub mod users;
pub mod validate;

pub use catalog::{Category, Genre, Title};
pub use error::{ModelError, Result as ModelResult};
pub use feedback::{Comment, Review};
pub use ids::{CategoryId, CommentId, GenreId, ReviewId, TitleId, UserId};
pub use role::Role;
pub use users::User;
pub use validate::{
    MAX_COMMENT_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SLUG_LEN,
    MAX_USERNAME_LEN, MAX_SCORE, MIN_SCORE, RESERVED_USERNAME,
};
