use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'comments' table joined with the author's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: i64,
    #[serde(skip)]
    pub author_id: i64,
    #[serde(skip)]
    pub review_id: i64,
    /// Author username.
    pub author: String,
    pub text: String,
    pub pub_date: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating or updating a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Comment must be between 1 and 1000 characters"
    ))]
    pub text: String,
}
