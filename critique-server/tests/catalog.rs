use axum::http::StatusCode;
use critique_model::Role;
use serde_json::{Value, json};
use sqlx::PgPool;

#[path = "support/mod.rs"]
mod support;

use support::build_test_app;

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn classifier_writes_are_admin_only(pool: PgPool) {
    let app = build_test_app(pool).await;
    let (_, user_token) = app.login("reader", Role::User).await;
    let (_, admin_token) = app.login("boss", Role::Admin).await;
    let payload = json!({ "name": "Films", "slug": "films" });

    app.server
        .post("/api/v1/categories")
        .json(&payload)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .post("/api/v1/categories")
        .authorization_bearer(&user_token)
        .json(&payload)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .post("/api/v1/categories")
        .authorization_bearer(&admin_token)
        .json(&payload)
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body, json!({ "name": "Films", "slug": "films" }));

    // Anyone can read the result back.
    let response = app.server.get("/api/v1/categories").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["slug"], "films");
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn bad_and_duplicate_slugs_are_rejected(pool: PgPool) {
    let app = build_test_app(pool).await;
    let (_, admin_token) = app.login("boss", Role::Admin).await;

    let response = app
        .server
        .post("/api/v1/genres")
        .authorization_bearer(&admin_token)
        .json(&json!({ "name": "Jazz", "slug": "not a slug" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body.get("slug").is_some(), "body: {body}");

    app.server
        .post("/api/v1/genres")
        .authorization_bearer(&admin_token)
        .json(&json!({ "name": "Jazz", "slug": "jazz" }))
        .await
        .assert_status(StatusCode::CREATED);
    app.server
        .post("/api/v1/genres")
        .authorization_bearer(&admin_token)
        .json(&json!({ "name": "Jazz Again", "slug": "jazz" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn classifiers_have_no_update_route(pool: PgPool) {
    let app = build_test_app(pool).await;
    let (_, admin_token) = app.login("boss", Role::Admin).await;
    app.server
        .post("/api/v1/categories")
        .authorization_bearer(&admin_token)
        .json(&json!({ "name": "Films", "slug": "films" }))
        .await
        .assert_status(StatusCode::CREATED);

    app.server
        .patch("/api/v1/categories/films")
        .authorization_bearer(&admin_token)
        .json(&json!({ "name": "Movies" }))
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);

    app.server
        .delete("/api/v1/categories/films")
        .authorization_bearer(&admin_token)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server
        .delete("/api/v1/categories/films")
        .authorization_bearer(&admin_token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

async fn seed_catalog(app: &support::TestApp, admin_token: &str) {
    for (path, name, slug) in [
        ("/api/v1/categories", "Films", "films"),
        ("/api/v1/genres", "Drama", "drama"),
        ("/api/v1/genres", "Comedy", "comedy"),
    ] {
        app.server
            .post(path)
            .authorization_bearer(admin_token)
            .json(&json!({ "name": name, "slug": slug }))
            .await
            .assert_status(StatusCode::CREATED);
    }
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn titles_round_trip_through_slug_references(pool: PgPool) {
    let app = build_test_app(pool).await;
    let (_, admin_token) = app.login("boss", Role::Admin).await;
    seed_catalog(&app, &admin_token).await;

    let response = app
        .server
        .post("/api/v1/titles")
        .authorization_bearer(&admin_token)
        .json(&json!({
            "name": "Solaris",
            "year": 1972,
            "category": "films",
            "genre": ["drama", "comedy"],
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["id"].as_i64().expect("title id");
    assert_eq!(body["category"]["slug"], "films");
    assert_eq!(body["rating"], Value::Null);
    let slugs: Vec<_> = body["genre"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, ["comedy", "drama"]);

    let response = app.server.get(&format!("/api/v1/titles/{id}")).await;
    response.assert_status_ok();
    let fetched: Value = response.json();
    assert_eq!(fetched["name"], "Solaris");
    assert_eq!(fetched["year"], 1972);
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn title_validation_failures_name_their_field(pool: PgPool) {
    let app = build_test_app(pool).await;
    let (_, admin_token) = app.login("boss", Role::Admin).await;
    seed_catalog(&app, &admin_token).await;

    let response = app
        .server
        .post("/api/v1/titles")
        .authorization_bearer(&admin_token)
        .json(&json!({
            "name": "From the Future",
            "year": 3000,
            "category": "films",
            "genre": ["drama"],
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body.get("year").is_some(), "body: {body}");

    let response = app
        .server
        .post("/api/v1/titles")
        .authorization_bearer(&admin_token)
        .json(&json!({
            "name": "Nowhere",
            "year": 2000,
            "category": "vinyl",
            "genre": ["drama"],
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body.get("category").is_some(), "body: {body}");
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn title_listing_filters_and_paginates(pool: PgPool) {
    let app = build_test_app(pool).await;
    let (_, admin_token) = app.login("boss", Role::Admin).await;
    seed_catalog(&app, &admin_token).await;

    for (name, year, genre) in [
        ("Solaris", 1972, "drama"),
        ("Stalker", 1979, "drama"),
        ("Airplane!", 1980, "comedy"),
    ] {
        app.server
            .post("/api/v1/titles")
            .authorization_bearer(&admin_token)
            .json(&json!({
                "name": name,
                "year": year,
                "category": "films",
                "genre": [genre],
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = app.server.get("/api/v1/titles?genre=drama").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 2);

    let response = app
        .server
        .get("/api/v1/titles?genre=drama&year=1979")
        .await;
    let body: Value = response.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["name"], "Stalker");

    let response = app.server.get("/api/v1/titles?limit=2&offset=2").await;
    let body: Value = response.json();
    assert_eq!(body["count"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrator = "critique_core::MIGRATOR")]
async fn missing_titles_are_not_found(pool: PgPool) {
    let app = build_test_app(pool).await;
    app.server
        .get("/api/v1/titles/999")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
