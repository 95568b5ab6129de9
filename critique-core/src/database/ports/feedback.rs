use async_trait::async_trait;
use critique_model::{Comment, CommentId, Review, ReviewId, TitleId, UserId};

use crate::database::Page;
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct ReviewPatch {
    pub text: Option<String>,
    pub score: Option<i16>,
}

#[async_trait]
pub trait ReviewsRepository: Send + Sync {
    /// Reviews of a title, publication time ascending.
    async fn list_for_title(
        &self,
        title_id: TitleId,
        page: Page,
    ) -> Result<(Vec<Review>, i64)>;

    async fn get(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<Option<Review>>;

    /// Fails with a conflict when the author already reviewed this title;
    /// the unique constraint is the source of truth.
    async fn create(
        &self,
        title_id: TitleId,
        author_id: UserId,
        text: &str,
        score: i16,
    ) -> Result<Review>;

    async fn update(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
        patch: ReviewPatch,
    ) -> Result<Review>;

    async fn delete(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
    ) -> Result<bool>;
}

#[async_trait]
pub trait CommentsRepository: Send + Sync {
    /// Comments under a review, publication time descending.
    async fn list_for_review(
        &self,
        review_id: ReviewId,
        page: Page,
    ) -> Result<(Vec<Comment>, i64)>;

    async fn get(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<Option<Comment>>;

    async fn create(
        &self,
        review_id: ReviewId,
        author_id: UserId,
        text: &str,
    ) -> Result<Comment>;

    async fn update(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
        text: &str,
    ) -> Result<Comment>;

    async fn delete(
        &self,
        review_id: ReviewId,
        comment_id: CommentId,
    ) -> Result<bool>;
}
