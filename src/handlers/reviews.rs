// src/handlers/reviews.rs

use axum::{
    Json,
    extract::{OriginalUri, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        pagination::{Page, PageParams},
        review::{CreateReviewRequest, UpdateReviewRequest},
    },
    policy::{Action, Principal, Resource, authorize},
    store,
    utils::{
        extract::{JsonBody, PathParams, QueryParams},
        text::ensure_not_blank,
    },
};

/// Lists the reviews of a title, newest first.
pub async fn list_reviews(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    principal: Principal,
    OriginalUri(uri): OriginalUri,
    PathParams(title_id): PathParams<i64>,
    QueryParams(page): QueryParams<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Action::List, Resource::Review { author_id: None })?;
    let (limit, offset) = page.resolve(config.page_size);
    let (reviews, count) = store::reviews::list(&pool, title_id, limit, offset).await?;
    Ok(Json(Page::new(reviews, count, limit, offset, &uri)))
}

pub async fn get_review(
    State(pool): State<SqlitePool>,
    principal: Principal,
    PathParams((title_id, review_id)): PathParams<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let review = store::reviews::get(&pool, title_id, review_id).await?;
    authorize(
        &principal,
        Action::Retrieve,
        Resource::Review { author_id: Some(review.author_id) },
    )?;
    Ok(Json(review))
}

/// Posts the caller's review of a title.
/// Requires: Login. One review per user per title.
pub async fn create_review(
    State(pool): State<SqlitePool>,
    principal: Principal,
    PathParams(title_id): PathParams<i64>,
    JsonBody(payload): JsonBody<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Action::Create, Resource::Review { author_id: None })?;
    let author = principal.require()?;
    payload.validate()?;
    ensure_not_blank("text", &payload.text)?;

    let review = store::reviews::create(&pool, author.id, title_id, &payload.text, payload.score).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Edits text and/or score.
/// Requires: Login + (Author OR Moderator OR Admin).
pub async fn update_review(
    State(pool): State<SqlitePool>,
    principal: Principal,
    PathParams((title_id, review_id)): PathParams<(i64, i64)>,
    JsonBody(payload): JsonBody<UpdateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let review = store::reviews::get(&pool, title_id, review_id).await?;
    authorize(
        &principal,
        Action::Update,
        Resource::Review { author_id: Some(review.author_id) },
    )?;
    payload.validate()?;

    if let Some(text) = &payload.text {
        ensure_not_blank("text", text)?;
    }

    let review = store::reviews::update(&pool, title_id, review_id, payload.text.as_deref(), payload.score).await?;
    Ok(Json(review))
}

/// Deletes a review and its comments.
/// Requires: Login + (Author OR Moderator OR Admin).
pub async fn delete_review(
    State(pool): State<SqlitePool>,
    principal: Principal,
    PathParams((title_id, review_id)): PathParams<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let review = store::reviews::get(&pool, title_id, review_id).await?;
    authorize(
        &principal,
        Action::Delete,
        Resource::Review { author_id: Some(review.author_id) },
    )?;

    store::reviews::delete(&pool, title_id, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
