//! Category and genre endpoints.
//!
//! The two resources share a shape (name plus unique slug) and a surface:
//! anonymous list, admin create, admin delete by slug. There is no detail or
//! update route; a slug is corrected by deleting and re-creating it.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use critique_model::{Category, Genre, User, validate};
use serde::Deserialize;

use crate::authz::{Capability, require};
use crate::errors::{AppError, AppResult};
use crate::extract::{PageParams, Paginated};
use crate::infra::app_state::AppState;

// Paging fields are spelled out because serde_urlencoded cannot flatten
// non-string fields.
#[derive(Debug, Deserialize)]
pub struct ClassifierListParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ClassifierListParams {
    fn page(&self) -> PageParams {
        PageParams {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewClassifier {
    pub name: String,
    pub slug: String,
}

impl NewClassifier {
    fn validate(&self) -> AppResult<()> {
        validate::validate_name(&self.name)?;
        validate::validate_slug(&self.slug)?;
        Ok(())
    }
}

/// `GET /categories`
pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<ClassifierListParams>,
) -> AppResult<Json<Paginated<Category>>> {
    let (items, count) = state
        .repos
        .categories
        .list(params.search.as_deref(), params.page().page())
        .await?;
    Ok(Json(Paginated::new(count, items)))
}

/// `POST /categories` (admin)
pub async fn create_category(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(req): Json<NewClassifier>,
) -> AppResult<(StatusCode, Json<Category>)> {
    require(Some(&caller), Capability::Admin, None)?;
    req.validate()?;
    let category = state.repos.categories.create(&req.name, &req.slug).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `DELETE /categories/{slug}` (admin)
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    require(Some(&caller), Capability::Admin, None)?;
    if state.repos.categories.delete_by_slug(&slug).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("no category with slug {slug}")))
    }
}

/// `GET /genres`
pub async fn list_genres(
    State(state): State<AppState>,
    Query(params): Query<ClassifierListParams>,
) -> AppResult<Json<Paginated<Genre>>> {
    let (items, count) = state
        .repos
        .genres
        .list(params.search.as_deref(), params.page().page())
        .await?;
    Ok(Json(Paginated::new(count, items)))
}

/// `POST /genres` (admin)
pub async fn create_genre(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(req): Json<NewClassifier>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    require(Some(&caller), Capability::Admin, None)?;
    req.validate()?;
    let genre = state.repos.genres.create(&req.name, &req.slug).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

/// `DELETE /genres/{slug}` (admin)
pub async fn delete_genre(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    require(Some(&caller), Capability::Admin, None)?;
    if state.repos.genres.delete_by_slug(&slug).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("no genre with slug {slug}")))
    }
}
