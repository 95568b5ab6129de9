use axum::http::StatusCode;
use critique_model::Role;
use serde_json::{Value, json};
use sqlx::PgPool;

#[path = "support/mod.rs"]
mod support;

use support::build_test_app;

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn signup_rejects_reserved_and_malformed_usernames(pool: PgPool) {
    let app = build_test_app(pool).await;

    let response = app
        .server
        .post("/api/v1/auth/signup")
        .json(&json!({ "username": "me", "email": "me@example.com" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body.get("username").is_some(), "body: {body}");

    let response = app
        .server
        .post("/api/v1/auth/signup")
        .json(&json!({ "username": "no spaces", "email": "x@example.com" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Rejected signups leave no account behind.
    for username in ["me", "no spaces"] {
        let user = app
            .state
            .repos
            .users
            .get_by_username(username)
            .await
            .unwrap();
        assert!(user.is_none(), "account created for `{username}`");
    }
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn signup_is_repeatable_but_collisions_fail(pool: PgPool) {
    let app = build_test_app(pool).await;
    let payload = json!({ "username": "bob", "email": "bob@example.com" });

    let response = app.server.post("/api/v1/auth/signup").json(&payload).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["username"], "bob");
    assert_eq!(body["email"], "bob@example.com");

    // Same pair again: a fresh code, not an error.
    app.server
        .post("/api/v1/auth/signup")
        .json(&payload)
        .await
        .assert_status_ok();

    // Taken username with another email.
    let response = app
        .server
        .post("/api/v1/auth/signup")
        .json(&json!({ "username": "bob", "email": "other@example.com" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn token_exchange_is_single_use(pool: PgPool) {
    let app = build_test_app(pool).await;
    app.server
        .post("/api/v1/auth/signup")
        .json(&json!({ "username": "bob", "email": "bob@example.com" }))
        .await
        .assert_status_ok();

    let user = app
        .state
        .repos
        .users
        .get_by_username("bob")
        .await
        .unwrap()
        .unwrap();
    app.plant_confirmation_code(&user, "SECRETCODE").await;

    let response = app
        .server
        .post("/api/v1/auth/token")
        .json(&json!({ "username": "bob", "confirmation_code": "SECRETCODE" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let token = body["token"].as_str().expect("token in body");

    // The token authenticates requests.
    let response = app
        .server
        .get("/api/v1/users/me")
        .authorization_bearer(token)
        .await;
    response.assert_status_ok();
    let me: Value = response.json();
    assert_eq!(me["username"], "bob");

    // Replaying the spent code fails.
    let response = app
        .server
        .post("/api/v1/auth/token")
        .json(&json!({ "username": "bob", "confirmation_code": "SECRETCODE" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn token_for_unknown_user_is_not_found(pool: PgPool) {
    let app = build_test_app(pool).await;
    let response = app
        .server
        .post("/api/v1/auth/token")
        .json(&json!({ "username": "ghost", "confirmation_code": "whatever" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn wrong_code_is_rejected(pool: PgPool) {
    let app = build_test_app(pool).await;
    let (user, _) = app.login("bob", Role::User).await;
    app.plant_confirmation_code(&user, "RIGHT").await;

    let response = app
        .server
        .post("/api/v1/auth/token")
        .json(&json!({ "username": "bob", "confirmation_code": "WRONG" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body.get("confirmation_code").is_some(), "body: {body}");
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn protected_routes_require_a_valid_token(pool: PgPool) {
    let app = build_test_app(pool).await;

    app.server
        .get("/api/v1/users/me")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .get("/api/v1/users/me")
        .authorization_bearer("not-a-token")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
