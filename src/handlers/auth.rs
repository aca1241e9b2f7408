// src/handlers/auth.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{SignupRequest, TokenRequest},
    store,
    utils::{
        extract::JsonBody,
        hash::{generate_confirmation_code, hash_code, verify_code},
        jwt::sign_jwt,
        mailer::Mailer,
    },
};

/// Registers an account (or re-issues the code for an existing one) and
/// sends a confirmation code.
///
/// Only the Argon2 hash of the code is stored. Delivery failure is logged
/// and does not fail the request.
pub async fn signup(
    State(pool): State<SqlitePool>,
    State(mailer): State<Arc<dyn Mailer>>,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let code = generate_confirmation_code();
    let code_hash = hash_code(&code)?;

    let user = store::users::register(&pool, &payload.username, &payload.email, &code_hash).await?;

    if let Err(e) = mailer
        .send_confirmation_code(&user.username, &user.email, &code)
        .await
    {
        tracing::error!(
            "Failed to deliver confirmation code to '{}': {}",
            user.username,
            e
        );
    }

    Ok(Json(json!({
        "email": user.email,
        "username": user.username,
    })))
}

/// Exchanges a username and confirmation code for a JWT.
pub async fn token(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    JsonBody(payload): JsonBody<TokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = store::users::get_by_username(&pool, &payload.username).await?;

    let is_valid = match &user.confirmation_code {
        Some(code_hash) => {
            verify_code(&payload.confirmation_code, code_hash)?
                && store::users::consume_confirmation_code(&pool, user.id, code_hash).await?
        }
        None => false,
    };

    if !is_valid {
        return Err(AppError::field(
            "confirmation_code",
            "Invalid confirmation code.",
        ));
    }

    let token = sign_jwt(user.id, user.role, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({ "token": token })))
}
