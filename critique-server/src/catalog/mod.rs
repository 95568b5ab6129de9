pub mod classifier_handlers;
pub mod title_handlers;
