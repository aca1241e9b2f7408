use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'reviews' table joined with the author's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: i64,
    #[serde(skip)]
    pub author_id: i64,
    #[serde(skip)]
    pub title_id: i64,
    /// Author username.
    pub author: String,
    pub text: String,
    pub score: i64,
    pub pub_date: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating a new review.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(length(
        min = 1,
        max = 10000,
        message = "Text must be between 1 and 10000 characters"
    ))]
    pub text: String,

    #[validate(range(min = 1, max = 10, message = "Score must be between 1 and 10."))]
    pub score: i64,
}

/// DTO for updating a review. `pub_date` is never touched.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(length(
        min = 1,
        max = 10000,
        message = "Text must be between 1 and 10000 characters"
    ))]
    pub text: Option<String>,

    #[validate(range(min = 1, max = 10, message = "Score must be between 1 and 10."))]
    pub score: Option<i64>,
}
