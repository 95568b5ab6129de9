use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use critique_model::{Comment, CommentId, Review, ReviewId, TitleId, User, validate};
use serde::Deserialize;

use crate::authz::{Capability, require};
use crate::errors::{AppError, AppResult};
use crate::extract::{PageParams, Paginated};
use crate::infra::app_state::AppState;

/// Comments live under `/titles/{t}/reviews/{r}/comments`; both ancestors
/// must resolve, and the review must belong to that title.
async fn require_review(
    state: &AppState,
    title_id: i64,
    review_id: i64,
) -> AppResult<Review> {
    if !state.repos.titles.exists(TitleId(title_id)).await? {
        return Err(AppError::not_found(format!(
            "no title with id {title_id}"
        )));
    }
    state
        .repos
        .reviews
        .get(TitleId(title_id), ReviewId(review_id))
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("no review with id {review_id}"))
        })
}

async fn require_comment(
    state: &AppState,
    review_id: ReviewId,
    comment_id: i64,
) -> AppResult<Comment> {
    state
        .repos
        .comments
        .get(review_id, CommentId(comment_id))
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("no comment with id {comment_id}"))
        })
}

/// `GET /titles/{title_id}/reviews/{review_id}/comments`
pub async fn list_comments(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Paginated<Comment>>> {
    let review = require_review(&state, title_id, review_id).await?;
    let (comments, count) = state
        .repos
        .comments
        .list_for_review(review.id, params.page())
        .await?;
    Ok(Json(Paginated::new(count, comments)))
}

/// `GET /titles/{title_id}/reviews/{review_id}/comments/{comment_id}`
pub async fn get_comment(
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
) -> AppResult<Json<Comment>> {
    let review = require_review(&state, title_id, review_id).await?;
    let comment = require_comment(&state, review.id, comment_id).await?;
    Ok(Json(comment))
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

/// `POST /titles/{title_id}/reviews/{review_id}/comments`
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let review = require_review(&state, title_id, review_id).await?;
    validate::validate_comment_text(&req.text)?;

    let comment = state
        .repos
        .comments
        .create(review.id, caller.id, &req.text)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// `PATCH /titles/{title_id}/reviews/{review_id}/comments/{comment_id}`
pub async fn patch_comment(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<Json<Comment>> {
    let review = require_review(&state, title_id, review_id).await?;
    let comment = require_comment(&state, review.id, comment_id).await?;
    require(Some(&caller), Capability::WriteOwn, Some(comment.author_id))?;
    validate::validate_comment_text(&req.text)?;

    let updated = state
        .repos
        .comments
        .update(review.id, comment.id, &req.text)
        .await?;
    Ok(Json(updated))
}

/// `DELETE /titles/{title_id}/reviews/{review_id}/comments/{comment_id}`
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
) -> AppResult<StatusCode> {
    let review = require_review(&state, title_id, review_id).await?;
    let comment = require_comment(&state, review.id, comment_id).await?;
    require(Some(&caller), Capability::WriteOwn, Some(comment.author_id))?;

    state.repos.comments.delete(review.id, comment.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
