use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use critique_core::database::ports::ReviewPatch;
use critique_model::{Review, ReviewId, TitleId, User, validate};
use serde::Deserialize;

use crate::authz::{Capability, require};
use crate::errors::{AppError, AppResult};
use crate::extract::{PageParams, Paginated};
use crate::infra::app_state::AppState;

/// Every review route hangs off a title; an unknown title is 404 before any
/// other check runs.
async fn require_title(state: &AppState, id: i64) -> AppResult<TitleId> {
    let title_id = TitleId(id);
    if state.repos.titles.exists(title_id).await? {
        Ok(title_id)
    } else {
        Err(AppError::not_found(format!("no title with id {id}")))
    }
}

async fn require_review(
    state: &AppState,
    title_id: TitleId,
    review_id: i64,
) -> AppResult<Review> {
    state
        .repos
        .reviews
        .get(title_id, ReviewId(review_id))
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("no review with id {review_id}"))
        })
}

/// `GET /titles/{title_id}/reviews`
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(title_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Paginated<Review>>> {
    let title_id = require_title(&state, title_id).await?;
    let (reviews, count) = state
        .repos
        .reviews
        .list_for_title(title_id, params.page())
        .await?;
    Ok(Json(Paginated::new(count, reviews)))
}

/// `GET /titles/{title_id}/reviews/{review_id}`
pub async fn get_review(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> AppResult<Json<Review>> {
    let title_id = require_title(&state, title_id).await?;
    let review = require_review(&state, title_id, review_id).await?;
    Ok(Json(review))
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub text: String,
    pub score: i16,
}

/// `POST /titles/{title_id}/reviews`
pub async fn create_review(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(title_id): Path<i64>,
    Json(req): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let title_id = require_title(&state, title_id).await?;
    validate::validate_score(req.score)?;

    let review = state
        .repos
        .reviews
        .create(title_id, caller.id, &req.text, req.score)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewPatchRequest {
    pub text: Option<String>,
    pub score: Option<i16>,
}

/// `PATCH /titles/{title_id}/reviews/{review_id}`
pub async fn patch_review(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Json(req): Json<ReviewPatchRequest>,
) -> AppResult<Json<Review>> {
    let title_id = require_title(&state, title_id).await?;
    let review = require_review(&state, title_id, review_id).await?;
    require(Some(&caller), Capability::WriteOwn, Some(review.author_id))?;
    if let Some(score) = req.score {
        validate::validate_score(score)?;
    }

    let updated = state
        .repos
        .reviews
        .update(
            title_id,
            review.id,
            ReviewPatch {
                text: req.text,
                score: req.score,
            },
        )
        .await?;
    Ok(Json(updated))
}

/// `DELETE /titles/{title_id}/reviews/{review_id}`
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    let title_id = require_title(&state, title_id).await?;
    let review = require_review(&state, title_id, review_id).await?;
    require(Some(&caller), Capability::WriteOwn, Some(review.author_id))?;

    state.repos.reviews.delete(title_id, review.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
