use axum::{Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::UpdateUserRequest,
    policy::{Action, Principal, Resource, authorize},
    store,
    utils::extract::JsonBody,
};

/// Get the current user's account.
pub async fn get_me(
    State(pool): State<SqlitePool>,
    principal: Principal,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Action::Retrieve, Resource::OwnAccount)?;
    let me = principal.require()?;

    let user = store::users::get_by_username(&pool, &me.username).await?;
    Ok(Json(user))
}

/// Update the current user's account.
/// A `role` in the body is ignored: nobody promotes themselves.
pub async fn update_me(
    State(pool): State<SqlitePool>,
    principal: Principal,
    JsonBody(mut payload): JsonBody<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&principal, Action::Update, Resource::OwnAccount)?;
    let me = principal.require()?;

    payload.role = None;
    payload.validate()?;

    let user = store::users::update(&pool, &me.username, &payload).await?;
    Ok(Json(user))
}
