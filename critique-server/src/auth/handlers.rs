use axum::{Json, extract::State};
use chrono::{Duration, Utc};
use critique_core::auth;
use critique_model::validate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::errors::AppResult;
use crate::infra::app_state::AppState;
use crate::mail;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub email: String,
    pub username: String,
}

/// `POST /auth/signup`
///
/// Registers (or re-registers) an account and dispatches a fresh
/// confirmation code. Retrying with the same username/email pair rotates the
/// code instead of failing, so a lost code is recoverable.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> AppResult<Json<SignupResponse>> {
    validate::validate_username(&req.username)?;
    validate::validate_email(&req.email)?;

    let user = state
        .repos
        .users
        .get_or_create(&req.username, &req.email)
        .await?;

    let code = auth::generate_confirmation_code();
    let hash =
        auth::hash_confirmation_code(&state.config.auth_token_key, user.id, &code);
    state
        .repos
        .users
        .store_confirmation_code_hash(user.id, &hash)
        .await?;
    mail::send_confirmation_code(&user.email, &user.username, &code);

    info!(username = %user.username, "signup processed");
    Ok(Json(SignupResponse {
        email: user.email,
        username: user.username,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

/// `POST /auth/token`
///
/// Exchanges a confirmation code for an access token. An unknown username is
/// 404 so clients can distinguish "never signed up" from "wrong code". Codes
/// are single use; the stored hash is cleared on success.
pub async fn token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> AppResult<Json<Value>> {
    let user = state
        .repos
        .users
        .get_by_username(&req.username)
        .await?
        .ok_or_else(|| {
            crate::errors::AppError::not_found(format!(
                "no user named {}",
                req.username
            ))
        })?;

    let stored = state.repos.users.confirmation_code_hash(user.id).await?;
    let presented = auth::hash_confirmation_code(
        &state.config.auth_token_key,
        user.id,
        &req.confirmation_code,
    );
    if stored.as_deref() != Some(presented.as_str()) {
        return Err(crate::errors::AppError::field(
            "confirmation_code",
            "invalid or already used confirmation code",
        ));
    }

    let token = auth::generate_access_token();
    let expires_at = Utc::now() + Duration::hours(state.config.token_ttl_hours);
    state
        .repos
        .access_tokens
        .insert(&auth::hash_access_token(&token), user.id, expires_at)
        .await?;
    state.repos.users.clear_confirmation_code(user.id).await?;

    info!(username = %user.username, "access token issued");
    Ok(Json(json!({ "token": token })))
}
