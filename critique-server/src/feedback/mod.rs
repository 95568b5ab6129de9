pub mod comment_handlers;
pub mod review_handlers;
