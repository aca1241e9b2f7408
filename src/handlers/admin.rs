// src/handlers/admin.rs

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
        user::{CreateUserRequest, UpdateUserRequest, UserListParams},
    },
    policy::{Action, Principal, Resource, authorize},
    store,
    utils::extract::{JsonBody, PathParams, QueryParams},
};

/// Lists all accounts, optionally filtered with `?search=` on the username.
/// Admin only.
pub async fn list_users(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    principal: Principal,
    OriginalUri(uri): OriginalUri,
    QueryParams(page): QueryParams<PageParams>,
    QueryParams(params): QueryParams<UserListParams>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Action::List, Resource::UserAccounts)?;

    let (limit, offset) = page.resolve(config.page_size);
    let (users, count) = store::users::list(&pool, params.search.as_deref(), limit, offset).await?;
    Ok(Json(Page::new(users, count, limit, offset, &uri)))
}

/// Creates a new account with a specific role.
/// Admin only.
pub async fn create_user(
    State(pool): State<SqlitePool>,
    principal: Principal,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Action::Create, Resource::UserAccounts)?;
    payload.validate()?;

    let user = store::users::create(&pool, &payload).await?;
    tracing::info!("Admin created user '{}' ({:?})", user.username, user.role);
    Ok((StatusCode::CREATED, Json(user)))
}

/// Admin only.
pub async fn get_user(
    State(pool): State<SqlitePool>,
    principal: Principal,
    PathParams(username): PathParams<String>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Action::Retrieve, Resource::UserAccounts)?;
    let user = store::users::get_by_username(&pool, &username).await?;
    Ok(Json(user))
}

/// Updates account information, role included.
/// Admin only.
pub async fn update_user(
    State(pool): State<SqlitePool>,
    principal: Principal,
    PathParams(username): PathParams<String>,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Action::Update, Resource::UserAccounts)?;
    payload.validate()?;

    let user = store::users::update(&pool, &username, &payload).await?;
    Ok(Json(user))
}

/// Deletes an account together with its reviews and comments.
/// Admin only.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    principal: Principal,
    PathParams(username): PathParams<String>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Action::Delete, Resource::UserAccounts)?;
    store::users::delete(&pool, &username).await?;
    Ok(StatusCode::NO_CONTENT)
}
