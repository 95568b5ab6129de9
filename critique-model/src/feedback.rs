use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ids::{CommentId, ReviewId, TitleId, UserId};

/// A user's review of a title. At most one review per (title, author) pair;
/// the constraint lives in the database, not just in request validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    pub id: ReviewId,
    #[serde(rename = "title")]
    pub title_id: TitleId,
    pub text: String,
    /// Author is serialized as the username, never the internal id.
    #[serde(rename = "author")]
    pub author_username: String,
    #[serde(skip_serializing)]
    pub author_id: UserId,
    pub score: i16,
    pub pub_date: DateTime<Utc>,
}

/// A comment attached to a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: CommentId,
    #[serde(rename = "review")]
    pub review_id: ReviewId,
    pub text: String,
    #[serde(rename = "author")]
    pub author_username: String,
    #[serde(skip_serializing)]
    pub author_id: UserId,
    pub pub_date: DateTime<Utc>,
}
