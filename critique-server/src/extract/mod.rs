pub mod pagination;

pub use pagination::{PageParams, Paginated};
