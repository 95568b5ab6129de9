use std::{fmt, sync::Arc};

use critique_core::Repositories;

use crate::infra::config::Config;

/// Shared handler state. Cloning is cheap, everything inside is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub repos: Arc<Repositories>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repos: Repositories, config: Config) -> Self {
        Self {
            repos: Arc::new(repos),
            config: Arc::new(config),
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
