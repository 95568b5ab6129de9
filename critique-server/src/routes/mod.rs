pub mod v1;

use axum::Router;

use crate::infra::app_state::AppState;

/// Main API router. Versions nest under `/api`.
pub fn create_api_router(state: AppState) -> Router<AppState> {
    Router::new().nest("/api/v1", v1::create_v1_router(state))
}
