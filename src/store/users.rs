// src/store/users.rs

use std::collections::BTreeSet;

use sqlx::SqlitePool;

use crate::{
    error::{AppError, is_unique_violation},
    models::user::{CreateUserRequest, Role, UpdateUserRequest, User},
    store::{like_pattern, rating},
};

const SELECT_USER: &str = r#"
    SELECT id, username, email, first_name, last_name, bio, role, confirmation_code
    FROM users
"#;

fn not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// Maps a UNIQUE failure on 'users' to the field that collided.
fn map_write_error(e: sqlx::Error, username: &str, email: &str) -> AppError {
    if is_unique_violation(&e) {
        let message = e.to_string();
        if message.contains("users.email") {
            AppError::field("email", format!("Email '{}' is already registered.", email))
        } else {
            AppError::field("username", format!("Username '{}' already exists", username))
        }
    } else {
        tracing::error!("Failed to write user: {:?}", e);
        AppError::from(e)
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("{} WHERE id = ?", SELECT_USER))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("{} WHERE username = ?", SELECT_USER))
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn get_by_username(pool: &SqlitePool, username: &str) -> Result<User, AppError> {
    find_by_username(pool, username).await?.ok_or_else(not_found)
}

/// Lists accounts ordered by username, optionally filtered by a username substring.
pub async fn list(
    pool: &SqlitePool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<User>, i64), AppError> {
    let pattern = search.map(like_pattern);

    let count: i64 = sqlx::query_scalar(
        r#"SELECT COUNT(*) FROM users WHERE (?1 IS NULL OR username LIKE ?1 ESCAPE '\')"#,
    )
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    let users = sqlx::query_as::<_, User>(&format!(
        r#"{} WHERE (?1 IS NULL OR username LIKE ?1 ESCAPE '\') ORDER BY username LIMIT ?2 OFFSET ?3"#,
        SELECT_USER
    ))
    .bind(&pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::from(e)
    })?;

    Ok((users, count))
}

pub async fn create(pool: &SqlitePool, payload: &CreateUserRequest) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, first_name, last_name, bio, role)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, username, email, first_name, last_name, bio, role, confirmation_code
        "#,
    )
    .bind(&payload.username)
    .bind(&payload.email)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.bio)
    .bind(payload.role)
    .fetch_one(pool)
    .await
    .map_err(|e| map_write_error(e, &payload.username, &payload.email))
}

/// Signup: creates a `user` account or, when the exact (username, email)
/// pair already exists, reuses it. Either way the stored code hash is replaced.
pub async fn register(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    code_hash: &str,
) -> Result<User, AppError> {
    if let Some(existing) = find_by_username(pool, username).await? {
        if existing.email != email {
            return Err(AppError::field(
                "username",
                format!("Username '{}' already exists", username),
            ));
        }

        return sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET confirmation_code = ?
            WHERE id = ?
            RETURNING id, username, email, first_name, last_name, bio, role, confirmation_code
            "#,
        )
        .bind(code_hash)
        .bind(existing.id)
        .fetch_one(pool)
        .await
        .map_err(AppError::from);
    }

    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, confirmation_code)
        VALUES (?, ?, ?)
        RETURNING id, username, email, first_name, last_name, bio, role, confirmation_code
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(code_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| map_write_error(e, username, email))
}

/// Consumes a confirmation code after it was verified against `code_hash`.
///
/// Returns false when another request already consumed it or signup issued a
/// new one in the meantime.
pub async fn consume_confirmation_code(pool: &SqlitePool, id: i64, code_hash: &str) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE users SET confirmation_code = NULL WHERE id = ? AND confirmation_code = ?")
        .bind(id)
        .bind(code_hash)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Applies the non-empty fields of `changes` to the account.
pub async fn update(pool: &SqlitePool, username: &str, changes: &UpdateUserRequest) -> Result<User, AppError> {
    let current = get_by_username(pool, username).await?;

    let new_username = changes.username.as_deref().unwrap_or(&current.username);
    let new_email = changes.email.as_deref().unwrap_or(&current.email);

    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET username = ?, email = ?,
            first_name = COALESCE(?, first_name),
            last_name = COALESCE(?, last_name),
            bio = COALESCE(?, bio),
            role = COALESCE(?, role)
        WHERE id = ?
        RETURNING id, username, email, first_name, last_name, bio, role, confirmation_code
        "#,
    )
    .bind(new_username)
    .bind(new_email)
    .bind(&changes.first_name)
    .bind(&changes.last_name)
    .bind(&changes.bio)
    .bind(changes.role)
    .bind(current.id)
    .fetch_optional(pool)
    .await
    .map_err(|e| map_write_error(e, new_username, new_email))?
    .ok_or_else(not_found)
}

/// Deletes an account with its reviews and comments, then recomputes the
/// rating of every title the account had reviewed, all in one transaction.
pub async fn delete(pool: &SqlitePool, username: &str) -> Result<(), AppError> {
    let mut tx = super::begin_write(pool).await?;

    let reviewed: Vec<i64> = sqlx::query_scalar(
        r#"
        DELETE FROM reviews
        WHERE author_id = (SELECT id FROM users WHERE username = ?)
        RETURNING title_id
        "#,
    )
    .bind(username)
    .fetch_all(&mut *tx)
    .await?;

    let result = sqlx::query("DELETE FROM users WHERE username = ?")
        .bind(username)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete user: {:?}", e);
            AppError::from(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(not_found());
    }

    let titles: BTreeSet<i64> = reviewed.into_iter().collect();
    for title_id in titles {
        rating::recompute(&mut tx, title_id).await?;
    }

    tx.commit().await?;
    tracing::info!("Deleted user '{}'", username);
    Ok(())
}

/// Creates the configured admin account on first start.
pub async fn seed_admin(pool: &SqlitePool, username: &str, email: &str) -> Result<(), AppError> {
    if find_by_username(pool, username).await?.is_some() {
        return Ok(());
    }

    tracing::info!("Seeding admin user: {}", username);
    let payload = CreateUserRequest {
        username: username.to_string(),
        email: email.to_string(),
        first_name: String::new(),
        last_name: String::new(),
        bio: String::new(),
        role: Role::Admin,
    };
    create(pool, &payload).await?;
    tracing::info!("Admin user created successfully.");
    Ok(())
}
