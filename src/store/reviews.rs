// src/store/reviews.rs

//! Reviews: one per (author, title), newest first, scoped to their title.

use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    error::{AppError, is_foreign_key_violation, is_unique_violation},
    models::review::Review,
    store::{rating, titles},
};

const SELECT_REVIEW: &str = r#"
    SELECT r.id, r.author_id, r.title_id, u.username AS author, r.text, r.score, r.pub_date
    FROM reviews r
    JOIN users u ON u.id = r.author_id
"#;

fn not_found() -> AppError {
    AppError::NotFound("Review not found".to_string())
}

fn check_score(score: i64) -> Result<(), AppError> {
    if !(1..=10).contains(&score) {
        return Err(AppError::field("score", "Score must be between 1 and 10."));
    }
    Ok(())
}

async fn fetch(conn: &mut SqliteConnection, title_id: i64, review_id: i64) -> Result<Review, AppError> {
    sqlx::query_as::<_, Review>(&format!(
        "{} WHERE r.id = ? AND r.title_id = ?",
        SELECT_REVIEW
    ))
    .bind(review_id)
    .bind(title_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(not_found)
}

/// Lists a title's reviews, newest first.
pub async fn list(
    pool: &SqlitePool,
    title_id: i64,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Review>, i64), AppError> {
    titles::ensure_exists(pool, title_id).await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE title_id = ?")
        .bind(title_id)
        .fetch_one(pool)
        .await?;

    let reviews = sqlx::query_as::<_, Review>(&format!(
        "{} WHERE r.title_id = ? ORDER BY r.pub_date DESC, r.id DESC LIMIT ? OFFSET ?",
        SELECT_REVIEW
    ))
    .bind(title_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list reviews: {:?}", e);
        AppError::from(e)
    })?;

    Ok((reviews, count))
}

pub async fn get(pool: &SqlitePool, title_id: i64, review_id: i64) -> Result<Review, AppError> {
    let mut conn = pool.acquire().await?;
    fetch(&mut conn, title_id, review_id).await
}

/// Creates the author's review of a title and refreshes the title's rating.
///
/// A second review by the same author fails on the unique
/// `(author_id, title_id)` index, so concurrent attempts cannot both land.
pub async fn create(
    pool: &SqlitePool,
    author_id: i64,
    title_id: i64,
    text: &str,
    score: i64,
) -> Result<Review, AppError> {
    check_score(score)?;
    titles::ensure_exists(pool, title_id).await?;

    let mut tx = super::begin_write(pool).await?;

    let review_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO reviews (author_id, title_id, text, score, pub_date)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(author_id)
    .bind(title_id)
    .bind(text)
    .bind(score)
    .bind(chrono::Utc::now())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::field("non_field_errors", "You have already reviewed this title.")
        } else if is_foreign_key_violation(&e) {
            AppError::NotFound("Title not found".to_string())
        } else {
            tracing::error!("Failed to create review: {:?}", e);
            AppError::from(e)
        }
    })?;

    rating::recompute(&mut tx, title_id).await?;
    let review = fetch(&mut tx, title_id, review_id).await?;
    tx.commit().await?;

    tracing::info!("User {} reviewed title {} with score {}", author_id, title_id, score);
    Ok(review)
}

/// Applies a partial update. `pub_date` keeps its creation value.
pub async fn update(
    pool: &SqlitePool,
    title_id: i64,
    review_id: i64,
    text: Option<&str>,
    score: Option<i64>,
) -> Result<Review, AppError> {
    if let Some(score) = score {
        check_score(score)?;
    }

    let mut tx = super::begin_write(pool).await?;

    let result = sqlx::query(
        r#"
        UPDATE reviews
        SET text = COALESCE(?, text), score = COALESCE(?, score)
        WHERE id = ? AND title_id = ?
        "#,
    )
    .bind(text)
    .bind(score)
    .bind(review_id)
    .bind(title_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update review: {:?}", e);
        AppError::from(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(not_found());
    }

    rating::recompute(&mut tx, title_id).await?;
    let review = fetch(&mut tx, title_id, review_id).await?;
    tx.commit().await?;

    Ok(review)
}

/// Deletes a review and, through the schema, all of its comments.
pub async fn delete(pool: &SqlitePool, title_id: i64, review_id: i64) -> Result<(), AppError> {
    let mut tx = super::begin_write(pool).await?;

    let result = sqlx::query("DELETE FROM reviews WHERE id = ? AND title_id = ?")
        .bind(review_id)
        .bind(title_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete review: {:?}", e);
            AppError::from(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(not_found());
    }

    rating::recompute(&mut tx, title_id).await?;
    tx.commit().await?;

    Ok(())
}
