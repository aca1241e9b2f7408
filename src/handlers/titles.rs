// src/handlers/titles.rs

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
        title::{CreateTitleRequest, TitleFilter, UpdateTitleRequest, ensure_year_not_future},
    },
    policy::{Action, Principal, Resource, authorize},
    store,
    utils::extract::{JsonBody, PathParams, QueryParams},
};

/// Lists titles by name, filtered by `category`, `genre` (slugs), `name` and `year`.
pub async fn list_titles(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    principal: Principal,
    OriginalUri(uri): OriginalUri,
    QueryParams(page): QueryParams<PageParams>,
    QueryParams(filter): QueryParams<TitleFilter>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Action::List, Resource::Title)?;
    let (limit, offset) = page.resolve(config.page_size);
    let (titles, count) = store::titles::list(&pool, &filter, limit, offset).await?;
    Ok(Json(Page::new(titles, count, limit, offset, &uri)))
}

/// Retrieves a single title with its current rating.
pub async fn get_title(
    State(pool): State<SqlitePool>,
    principal: Principal,
    PathParams(title_id): PathParams<i64>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Action::Retrieve, Resource::Title)?;
    let title = store::titles::get(&pool, title_id).await?;
    Ok(Json(title))
}

/// Creates a title.
/// Admin only.
pub async fn create_title(
    State(pool): State<SqlitePool>,
    principal: Principal,
    JsonBody(payload): JsonBody<CreateTitleRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Action::Create, Resource::Title)?;
    payload.validate()?;
    ensure_year_not_future(payload.year)?;

    let title = store::titles::create(&pool, &payload).await?;
    Ok((StatusCode::CREATED, Json(title)))
}

/// Partially updates a title.
/// Admin only.
pub async fn update_title(
    State(pool): State<SqlitePool>,
    principal: Principal,
    PathParams(title_id): PathParams<i64>,
    JsonBody(payload): JsonBody<UpdateTitleRequest>,
) -> Result<impl IntoResponse, AppError> {
    store::titles::ensure_exists(&pool, title_id).await?;
    authorize(&principal, Action::Update, Resource::Title)?;
    payload.validate()?;
    if let Some(year) = payload.year {
        ensure_year_not_future(year)?;
    }

    let title = store::titles::update(&pool, title_id, &payload).await?;
    Ok(Json(title))
}

/// Deletes a title with all of its reviews and comments.
/// Admin only.
pub async fn delete_title(
    State(pool): State<SqlitePool>,
    principal: Principal,
    PathParams(title_id): PathParams<i64>,
) -> Result<impl IntoResponse, AppError> {
    store::titles::ensure_exists(&pool, title_id).await?;
    authorize(&principal, Action::Delete, Resource::Title)?;
    store::titles::delete(&pool, title_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
