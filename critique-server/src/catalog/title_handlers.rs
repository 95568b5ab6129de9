use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use critique_core::database::ports::{NewTitle, TitleFilter, TitlePatch};
use critique_model::{Title, TitleId, User, validate};
use serde::Deserialize;

use crate::authz::{Capability, require};
use crate::errors::{AppError, AppResult};
use crate::extract::{PageParams, Paginated};
use crate::infra::app_state::AppState;

// Paging fields are spelled out because serde_urlencoded cannot flatten
// non-string fields.
#[derive(Debug, Deserialize)]
pub struct TitleListParams {
    pub genre: Option<String>,
    pub category: Option<String>,
    pub year: Option<i32>,
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `GET /titles`
pub async fn list_titles(
    State(state): State<AppState>,
    Query(params): Query<TitleListParams>,
) -> AppResult<Json<Paginated<Title>>> {
    let filter = TitleFilter {
        genre: params.genre,
        category: params.category,
        year: params.year,
        name: params.name,
    };
    let page = PageParams {
        limit: params.limit,
        offset: params.offset,
    }
    .page();
    let (titles, count) = state.repos.titles.list(&filter, page).await?;
    Ok(Json(Paginated::new(count, titles)))
}

/// `GET /titles/{id}`
pub async fn get_title(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Title>> {
    let title = state
        .repos
        .titles
        .get(TitleId(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("no title with id {id}")))?;
    Ok(Json(title))
}

#[derive(Debug, Deserialize)]
pub struct CreateTitleRequest {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category: String,
    pub genre: Vec<String>,
}

/// `POST /titles` (admin)
pub async fn create_title(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(req): Json<CreateTitleRequest>,
) -> AppResult<(StatusCode, Json<Title>)> {
    require(Some(&caller), Capability::Admin, None)?;
    validate::validate_name(&req.name)?;
    validate::validate_year(req.year)?;

    let title = state
        .repos
        .titles
        .create(NewTitle {
            name: req.name,
            year: req.year,
            description: req.description,
            category: req.category,
            genre: req.genre,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(title)))
}

#[derive(Debug, Default, Deserialize)]
pub struct TitlePatchRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub genre: Option<Vec<String>>,
}

/// `PATCH /titles/{id}` (admin)
pub async fn patch_title(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(id): Path<i64>,
    Json(req): Json<TitlePatchRequest>,
) -> AppResult<Json<Title>> {
    require(Some(&caller), Capability::Admin, None)?;
    if let Some(name) = &req.name {
        validate::validate_name(name)?;
    }
    if let Some(year) = req.year {
        validate::validate_year(year)?;
    }

    let title = state
        .repos
        .titles
        .update(
            TitleId(id),
            TitlePatch {
                name: req.name,
                year: req.year,
                description: req.description,
                category: req.category,
                genre: req.genre,
            },
        )
        .await?;
    Ok(Json(title))
}

/// `DELETE /titles/{id}` (admin)
pub async fn delete_title(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    require(Some(&caller), Capability::Admin, None)?;
    if state.repos.titles.delete(TitleId(id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("no title with id {id}")))
    }
}
