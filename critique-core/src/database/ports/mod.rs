//! Repository ports. One trait per aggregate; the PostgreSQL
//! implementations live under `database::repositories`.

pub mod catalog;
pub mod feedback;
pub mod tokens;
pub mod users;

pub use catalog::{
    CategoriesRepository, GenresRepository, NewTitle, TitleFilter, TitlePatch,
    TitlesRepository,
};
pub use feedback::{CommentsRepository, ReviewPatch, ReviewsRepository};
pub use tokens::AccessTokensRepository;
pub use users::{NewUser, UserPatch, UsersRepository};
