// src/handlers/comments.rs

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
    models::{comment::CommentRequest, pagination::{Page, PageParams}},
    policy::{Action, Principal, Resource, authorize},
    store,
    utils::{
        extract::{JsonBody, PathParams, QueryParams},
        text::ensure_not_blank,
    },
};

/// List the comments of a review, newest first.
pub async fn list_comments(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    principal: Principal,
    OriginalUri(uri): OriginalUri,
    PathParams((title_id, review_id)): PathParams<(i64, i64)>,
    QueryParams(page): QueryParams<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Action::List, Resource::Comment { author_id: None })?;
    let (limit, offset) = page.resolve(config.page_size);
    let (comments, count) = store::comments::list(&pool, title_id, review_id, limit, offset).await?;
    Ok(Json(Page::new(comments, count, limit, offset, &uri)))
}

pub async fn get_comment(
    State(pool): State<SqlitePool>,
    principal: Principal,
    PathParams((title_id, review_id, comment_id)): PathParams<(i64, i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let comment = store::comments::get(&pool, title_id, review_id, comment_id).await?;
    authorize(
        &principal,
        Action::Retrieve,
        Resource::Comment { author_id: Some(comment.author_id) },
    )?;
    Ok(Json(comment))
}

/// Create a new comment.
/// Requires: Login.
pub async fn create_comment(
    State(pool): State<SqlitePool>,
    principal: Principal,
    PathParams((title_id, review_id)): PathParams<(i64, i64)>,
    JsonBody(payload): JsonBody<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Action::Create, Resource::Comment { author_id: None })?;
    let author = principal.require()?;
    payload.validate()?;
    ensure_not_blank("text", &payload.text)?;

    let comment = store::comments::create(&pool, author.id, title_id, review_id, &payload.text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Requires: Login + (Author OR Moderator OR Admin).
pub async fn update_comment(
    State(pool): State<SqlitePool>,
    principal: Principal,
    PathParams((title_id, review_id, comment_id)): PathParams<(i64, i64, i64)>,
    JsonBody(payload): JsonBody<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comment = store::comments::get(&pool, title_id, review_id, comment_id).await?;
    authorize(
        &principal,
        Action::Update,
        Resource::Comment { author_id: Some(comment.author_id) },
    )?;
    payload.validate()?;
    ensure_not_blank("text", &payload.text)?;

    let comment = store::comments::update(&pool, title_id, review_id, comment_id, &payload.text).await?;
    Ok(Json(comment))
}

/// Requires: Login + (Author OR Moderator OR Admin).
pub async fn delete_comment(
    State(pool): State<SqlitePool>,
    principal: Principal,
    PathParams((title_id, review_id, comment_id)): PathParams<(i64, i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let comment = store::comments::get(&pool, title_id, review_id, comment_id).await?;
    authorize(
        &principal,
        Action::Delete,
        Resource::Comment { author_id: Some(comment.author_id) },
    )?;

    store::comments::delete(&pool, title_id, review_id, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
