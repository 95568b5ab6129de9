use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::{
    auth::{self, middleware::auth_middleware},
    catalog::{classifier_handlers, title_handlers},
    feedback::{comment_handlers, review_handlers},
    infra::app_state::AppState,
    users::handlers as user_handlers,
};

/// All v1 routes. Reads on the catalog and on feedback are anonymous;
/// everything that writes, plus the user endpoints, sits behind bearer
/// authentication. Finer checks (admin, author-or-staff) live in the
/// handlers.
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        // Signup and token exchange
        .route("/auth/signup", post(auth::handlers::signup))
        .route("/auth/token", post(auth::handlers::token))
        // Anonymous reads
        .route("/categories", get(classifier_handlers::list_categories))
        .route("/genres", get(classifier_handlers::list_genres))
        .route("/titles", get(title_handlers::list_titles))
        .route("/titles/{title_id}", get(title_handlers::get_title))
        .route(
            "/titles/{title_id}/reviews",
            get(review_handlers::list_reviews),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}",
            get(review_handlers::get_review),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments",
            get(comment_handlers::list_comments),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
            get(comment_handlers::get_comment),
        )
        .merge(protected_routes(state))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Catalog administration
        .route("/categories", post(classifier_handlers::create_category))
        .route(
            "/categories/{slug}",
            delete(classifier_handlers::delete_category),
        )
        .route("/genres", post(classifier_handlers::create_genre))
        .route("/genres/{slug}", delete(classifier_handlers::delete_genre))
        .route("/titles", post(title_handlers::create_title))
        .route(
            "/titles/{title_id}",
            patch(title_handlers::patch_title)
                .delete(title_handlers::delete_title),
        )
        // Reviews and comments
        .route(
            "/titles/{title_id}/reviews",
            post(review_handlers::create_review),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}",
            patch(review_handlers::patch_review)
                .delete(review_handlers::delete_review),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments",
            post(comment_handlers::create_comment),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
            patch(comment_handlers::patch_comment)
                .delete(comment_handlers::delete_comment),
        )
        // Self service; the static segment wins over `{username}`
        .route(
            "/users/me",
            get(user_handlers::me_get).patch(user_handlers::me_patch),
        )
        // User administration
        .route(
            "/users",
            get(user_handlers::list_users).post(user_handlers::create_user),
        )
        .route(
            "/users/{username}",
            get(user_handlers::get_user)
                .patch(user_handlers::patch_user)
                .delete(user_handlers::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
