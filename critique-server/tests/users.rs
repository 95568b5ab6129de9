use axum::http::StatusCode;
use critique_model::Role;
use serde_json::{Value, json};
use sqlx::PgPool;

#[path = "support/mod.rs"]
mod support;

use support::build_test_app;

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn profile_self_service_ignores_role_changes(pool: PgPool) {
    let app = build_test_app(pool).await;
    let (_, token) = app.login("alice", Role::User).await;

    let response = app
        .server
        .get("/api/v1/users/me")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let me: Value = response.json();
    assert_eq!(me["username"], "alice");
    assert_eq!(me["role"], "user");

    let response = app
        .server
        .patch("/api/v1/users/me")
        .authorization_bearer(&token)
        .json(&json!({ "bio": "reads a lot", "role": "admin" }))
        .await;
    response.assert_status_ok();
    let me: Value = response.json();
    assert_eq!(me["bio"], "reads a lot");
    // The role field in the payload is dropped, not applied.
    assert_eq!(me["role"], "user");
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn user_administration_is_admin_only(pool: PgPool) {
    let app = build_test_app(pool).await;
    let (_, user_token) = app.login("alice", Role::User).await;
    let (_, admin_token) = app.login("boss", Role::Admin).await;

    app.server
        .get("/api/v1/users")
        .authorization_bearer(&user_token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .get("/api/v1/users")
        .authorization_bearer(&admin_token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 2);
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn admins_manage_accounts_by_username(pool: PgPool) {
    let app = build_test_app(pool).await;
    let (_, admin_token) = app.login("boss", Role::Admin).await;

    let response = app
        .server
        .post("/api/v1/users")
        .authorization_bearer(&admin_token)
        .json(&json!({
            "username": "carol",
            "email": "carol@example.com",
            "role": "moderator",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["role"], "moderator");

    let response = app
        .server
        .patch("/api/v1/users/carol")
        .authorization_bearer(&admin_token)
        .json(&json!({ "role": "admin", "first_name": "Carol" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["role"], "admin");
    assert_eq!(body["first_name"], "Carol");

    app.server
        .delete("/api/v1/users/carol")
        .authorization_bearer(&admin_token)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server
        .get("/api/v1/users/carol")
        .authorization_bearer(&admin_token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn duplicate_accounts_and_bad_usernames_fail(pool: PgPool) {
    let app = build_test_app(pool).await;
    let (_, admin_token) = app.login("boss", Role::Admin).await;

    app.server
        .post("/api/v1/users")
        .authorization_bearer(&admin_token)
        .json(&json!({ "username": "boss", "email": "new@example.com" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/api/v1/users")
        .authorization_bearer(&admin_token)
        .json(&json!({ "username": "me", "email": "me@example.com" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body.get("username").is_some(), "body: {body}");
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn user_search_narrows_the_listing(pool: PgPool) {
    let app = build_test_app(pool).await;
    let (_, admin_token) = app.login("boss", Role::Admin).await;
    app.login("bob", Role::User).await;
    app.login("bobby", Role::User).await;

    let response = app
        .server
        .get("/api/v1/users?search=bob")
        .authorization_bearer(&admin_token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 2);
    assert_eq!(body["results"][0]["username"], "bob");
}
