// src/handlers/catalog.rs

use axum::{
    Json,
    extract::{OriginalUri, State},
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        catalog::{CatalogEntry, CatalogListParams, CreateCatalogEntryRequest},
        pagination::{Page, PageParams},
    },
    policy::{Action, Principal, Resource, authorize},
    store::catalog::{self, Catalog},
    utils::extract::{JsonBody, PathParams, QueryParams},
};

fn resource(kind: Catalog) -> Resource {
    match kind {
        Catalog::Categories => Resource::Category,
        Catalog::Genres => Resource::Genre,
    }
}

async fn list(
    kind: Catalog,
    pool: &SqlitePool,
    config: &Config,
    principal: &Principal,
    page: PageParams,
    params: CatalogListParams,
    uri: &Uri,
) -> Result<Json<Page<CatalogEntry>>, AppError> {
    authorize(principal, Action::List, resource(kind))?;
    let (limit, offset) = page.resolve(config.page_size);
    let (entries, count) = catalog::list(pool, kind, params.search.as_deref(), limit, offset).await?;
    Ok(Json(Page::new(entries, count, limit, offset, uri)))
}

async fn create(
    kind: Catalog,
    pool: &SqlitePool,
    principal: &Principal,
    payload: CreateCatalogEntryRequest,
) -> Result<(StatusCode, Json<CatalogEntry>), AppError> {
    authorize(principal, Action::Create, resource(kind))?;
    payload.validate()?;

    let entry = catalog::create(pool, kind, &payload.name, &payload.slug).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn delete(
    kind: Catalog,
    pool: &SqlitePool,
    principal: &Principal,
    slug: &str,
) -> Result<StatusCode, AppError> {
    catalog::ensure_exists(pool, kind, slug).await?;
    authorize(principal, Action::Delete, resource(kind))?;
    catalog::delete(pool, kind, slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists categories, optionally filtered with `?search=`.
pub async fn list_categories(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    principal: Principal,
    OriginalUri(uri): OriginalUri,
    QueryParams(page): QueryParams<PageParams>,
    QueryParams(params): QueryParams<CatalogListParams>,
) -> Result<impl IntoResponse, AppError> {
    list(Catalog::Categories, &pool, &config, &principal, page, params, &uri).await
}

/// Creates a category.
/// Admin only.
pub async fn create_category(
    State(pool): State<SqlitePool>,
    principal: Principal,
    JsonBody(payload): JsonBody<CreateCatalogEntryRequest>,
) -> Result<impl IntoResponse, AppError> {
    create(Catalog::Categories, &pool, &principal, payload).await
}

/// Deletes a category by slug. Its titles stay, without a category.
/// Admin only.
pub async fn delete_category(
    State(pool): State<SqlitePool>,
    principal: Principal,
    PathParams(slug): PathParams<String>,
) -> Result<impl IntoResponse, AppError> {
    delete(Catalog::Categories, &pool, &principal, &slug).await
}

/// Lists genres, optionally filtered with `?search=`.
pub async fn list_genres(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    principal: Principal,
    OriginalUri(uri): OriginalUri,
    QueryParams(page): QueryParams<PageParams>,
    QueryParams(params): QueryParams<CatalogListParams>,
) -> Result<impl IntoResponse, AppError> {
    list(Catalog::Genres, &pool, &config, &principal, page, params, &uri).await
}

/// Creates a genre.
/// Admin only.
pub async fn create_genre(
    State(pool): State<SqlitePool>,
    principal: Principal,
    JsonBody(payload): JsonBody<CreateCatalogEntryRequest>,
) -> Result<impl IntoResponse, AppError> {
    create(Catalog::Genres, &pool, &principal, payload).await
}

/// Deletes a genre by slug. Titles lose it from their genre list.
/// Admin only.
pub async fn delete_genre(
    State(pool): State<SqlitePool>,
    principal: Principal,
    PathParams(slug): PathParams<String>,
) -> Result<impl IntoResponse, AppError> {
    delete(Catalog::Genres, &pool, &principal, &slug).await
}
