// src/store/comments.rs

use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    error::{AppError, is_foreign_key_violation},
    models::comment::Comment,
};

const SELECT_COMMENT: &str = r#"
    SELECT c.id, c.author_id, c.review_id, u.username AS author, c.text, c.pub_date
    FROM comments c
    JOIN users u ON u.id = c.author_id
    JOIN reviews r ON r.id = c.review_id
"#;

fn not_found() -> AppError {
    AppError::NotFound("Comment not found".to_string())
}

/// Fails with `NotFound` unless the review exists and belongs to the title.
pub async fn ensure_review(pool: &SqlitePool, title_id: i64, review_id: i64) -> Result<(), AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM reviews WHERE id = ? AND title_id = ?")
        .bind(review_id)
        .bind(title_id)
        .fetch_optional(pool)
        .await?
        .map(|_| ())
        .ok_or(AppError::NotFound("Review not found".to_string()))
}

async fn fetch(
    conn: &mut SqliteConnection,
    title_id: i64,
    review_id: i64,
    comment_id: i64,
) -> Result<Comment, AppError> {
    sqlx::query_as::<_, Comment>(&format!(
        "{} WHERE c.id = ? AND c.review_id = ? AND r.title_id = ?",
        SELECT_COMMENT
    ))
    .bind(comment_id)
    .bind(review_id)
    .bind(title_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(not_found)
}

/// Lists a review's comments, newest first.
pub async fn list(
    pool: &SqlitePool,
    title_id: i64,
    review_id: i64,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Comment>, i64), AppError> {
    ensure_review(pool, title_id, review_id).await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE review_id = ?")
        .bind(review_id)
        .fetch_one(pool)
        .await?;

    let comments = sqlx::query_as::<_, Comment>(&format!(
        "{} WHERE c.review_id = ? ORDER BY c.pub_date DESC, c.id DESC LIMIT ? OFFSET ?",
        SELECT_COMMENT
    ))
    .bind(review_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list comments: {:?}", e);
        AppError::from(e)
    })?;

    Ok((comments, count))
}

pub async fn get(
    pool: &SqlitePool,
    title_id: i64,
    review_id: i64,
    comment_id: i64,
) -> Result<Comment, AppError> {
    let mut conn = pool.acquire().await?;
    fetch(&mut conn, title_id, review_id, comment_id).await
}

/// Adds a comment under a review of the given title.
pub async fn create(
    pool: &SqlitePool,
    author_id: i64,
    title_id: i64,
    review_id: i64,
    text: &str,
) -> Result<Comment, AppError> {
    ensure_review(pool, title_id, review_id).await?;

    let mut conn = pool.acquire().await?;

    let comment_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO comments (author_id, review_id, text, pub_date)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(author_id)
    .bind(review_id)
    .bind(text)
    .bind(chrono::Utc::now())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            AppError::NotFound("Review not found".to_string())
        } else {
            tracing::error!("Failed to create comment: {:?}", e);
            AppError::from(e)
        }
    })?;

    fetch(&mut conn, title_id, review_id, comment_id).await
}

pub async fn update(
    pool: &SqlitePool,
    title_id: i64,
    review_id: i64,
    comment_id: i64,
    text: &str,
) -> Result<Comment, AppError> {
    let mut conn = pool.acquire().await?;

    let result = sqlx::query(
        r#"
        UPDATE comments SET text = ?
        WHERE id = ? AND review_id = ?
          AND review_id IN (SELECT id FROM reviews WHERE title_id = ?)
        "#,
    )
    .bind(text)
    .bind(comment_id)
    .bind(review_id)
    .bind(title_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update comment: {:?}", e);
        AppError::from(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(not_found());
    }

    fetch(&mut conn, title_id, review_id, comment_id).await
}

pub async fn delete(
    pool: &SqlitePool,
    title_id: i64,
    review_id: i64,
    comment_id: i64,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        DELETE FROM comments
        WHERE id = ? AND review_id = ?
          AND review_id IN (SELECT id FROM reviews WHERE title_id = ?)
        "#,
    )
    .bind(comment_id)
    .bind(review_id)
    .bind(title_id)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to delete comment: {:?}", e);
        AppError::from(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(not_found());
    }

    Ok(())
}
