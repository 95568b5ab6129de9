//! PostgreSQL implementations of the repository ports.

mod classifiers;
mod comments;
mod reviews;
mod titles;
mod tokens;
mod users;

pub use classifiers::{
    PostgresCategoriesRepository, PostgresGenresRepository,
};
pub use comments::PostgresCommentsRepository;
pub use reviews::PostgresReviewsRepository;
pub use titles::PostgresTitlesRepository;
pub use tokens::PostgresAccessTokensRepository;
pub use users::PostgresUsersRepository;

pub(crate) use users::{USER_COLUMNS, UserRow};
