use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use critique_core::database::ports::{NewUser, UserPatch};
use critique_model::{Role, User, validate};
use serde::Deserialize;

use crate::authz::{Capability, require};
use crate::errors::{AppError, AppResult};
use crate::extract::{PageParams, Paginated};
use crate::infra::app_state::AppState;

// Paging fields are spelled out because serde_urlencoded cannot flatten
// non-string fields.
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl UserListParams {
    fn page(&self) -> PageParams {
        PageParams {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// `GET /users` (admin)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<Paginated<User>>> {
    require(Some(&caller), Capability::Admin, None)?;
    let (users, count) = state
        .repos
        .users
        .list(params.search.as_deref(), params.page().page())
        .await?;
    Ok(Json(Paginated::new(count, users)))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub role: Role,
}

/// `POST /users` (admin)
pub async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    require(Some(&caller), Capability::Admin, None)?;
    validate::validate_username(&req.username)?;
    validate::validate_email(&req.email)?;

    let user = state
        .repos
        .users
        .create(NewUser {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            bio: req.bio,
            role: req.role,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/{username}` (admin)
pub async fn get_user(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(username): Path<String>,
) -> AppResult<Json<User>> {
    require(Some(&caller), Capability::Admin, None)?;
    let user = lookup(&state, &username).await?;
    Ok(Json(user))
}

#[derive(Debug, Default, Deserialize)]
pub struct UserPatchRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

impl UserPatchRequest {
    fn validate(&self) -> AppResult<()> {
        if let Some(username) = &self.username {
            validate::validate_username(username)?;
        }
        if let Some(email) = &self.email {
            validate::validate_email(email)?;
        }
        Ok(())
    }

    fn into_patch(self, allow_role: bool) -> UserPatch {
        UserPatch {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            // The self-service endpoint silently drops role changes.
            role: if allow_role { self.role } else { None },
        }
    }
}

/// `PATCH /users/{username}` (admin)
pub async fn patch_user(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(username): Path<String>,
    Json(req): Json<UserPatchRequest>,
) -> AppResult<Json<User>> {
    require(Some(&caller), Capability::Admin, None)?;
    req.validate()?;
    let user = lookup(&state, &username).await?;
    let updated = state
        .repos
        .users
        .update(user.id, req.into_patch(true))
        .await?;
    Ok(Json(updated))
}

/// `DELETE /users/{username}` (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(username): Path<String>,
) -> AppResult<StatusCode> {
    require(Some(&caller), Capability::Admin, None)?;
    if state.repos.users.delete_by_username(&username).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("no user named {username}")))
    }
}

/// `GET /users/me`
pub async fn me_get(Extension(caller): Extension<User>) -> Json<User> {
    Json(caller)
}

/// `PATCH /users/me`
///
/// Profile self-service. A `role` field in the payload is ignored rather
/// than rejected, so generic clients can echo back what they received.
pub async fn me_patch(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(req): Json<UserPatchRequest>,
) -> AppResult<Json<User>> {
    req.validate()?;
    let updated = state
        .repos
        .users
        .update(caller.id, req.into_patch(false))
        .await?;
    Ok(Json(updated))
}

async fn lookup(state: &AppState, username: &str) -> AppResult<User> {
    state
        .repos
        .users
        .get_by_username(username)
        .await?
        .ok_or_else(|| AppError::not_found(format!("no user named {username}")))
}
