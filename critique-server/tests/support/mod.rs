// Not every test binary uses every helper.
#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{Duration, Utc};
use critique_core::database::ports::UserPatch;
use critique_core::{Repositories, auth};
use critique_model::{Role, User};
use critique_server::{AppState, Config, build_app};
use sqlx::PgPool;

pub const TEST_TOKEN_KEY: &str = "test-token-key";

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

/// Builds the full router on top of the per-test pool.
pub async fn build_test_app(pool: PgPool) -> TestApp {
    let config = Config {
        server_host: "127.0.0.1".into(),
        server_port: 0,
        database_url: None,
        cors_allowed_origins: vec!["http://localhost:3000".into()],
        auth_token_key: TEST_TOKEN_KEY.into(),
        token_ttl_hours: 1,
    };
    let state = AppState::new(Repositories::postgres(pool), config);
    let server =
        TestServer::new(build_app(state.clone())).expect("test server");
    TestApp { server, state }
}

impl TestApp {
    /// Registers an account directly against the repositories and returns it
    /// with a valid bearer token, bypassing the confirmation-code exchange.
    pub async fn login(&self, username: &str, role: Role) -> (User, String) {
        let email = format!("{username}@example.com");
        let mut user = self
            .state
            .repos
            .users
            .get_or_create(username, &email)
            .await
            .expect("create user");
        if role != Role::User {
            user = self
                .state
                .repos
                .users
                .update(
                    user.id,
                    UserPatch {
                        role: Some(role),
                        ..Default::default()
                    },
                )
                .await
                .expect("set role");
        }

        let token = auth::generate_access_token();
        self.state
            .repos
            .access_tokens
            .insert(
                &auth::hash_access_token(&token),
                user.id,
                Utc::now() + Duration::hours(1),
            )
            .await
            .expect("store token");
        (user, token)
    }

    /// Plants a known confirmation code for the user, standing in for the
    /// out-of-band delivery channel.
    pub async fn plant_confirmation_code(&self, user: &User, code: &str) {
        let hash =
            auth::hash_confirmation_code(TEST_TOKEN_KEY, user.id, code);
        self.state
            .repos
            .users
            .store_confirmation_code_hash(user.id, &hash)
            .await
            .expect("store code hash");
    }
}
