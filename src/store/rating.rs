// src/store/rating.rs

use sqlx::SqliteConnection;

use crate::error::AppError;

/// Rounds a mean score to the nearest integer, half away from zero.
pub fn rating_from_mean(mean: Option<f64>) -> Option<i64> {
    mean.map(|m| m.round() as i64)
}

/// Recomputes `titles.rating` from the title's reviews.
///
/// Must run on the connection of the transaction that changed the reviews,
/// so the stored rating and the review set commit together.
pub async fn recompute(conn: &mut SqliteConnection, title_id: i64) -> Result<Option<i64>, AppError> {
    let mean: Option<f64> = sqlx::query_scalar("SELECT AVG(score) FROM reviews WHERE title_id = ?")
        .bind(title_id)
        .fetch_one(&mut *conn)
        .await?;

    let rating = rating_from_mean(mean);

    sqlx::query("UPDATE titles SET rating = ? WHERE id = ?")
        .bind(rating)
        .bind(title_id)
        .execute(&mut *conn)
        .await?;

    tracing::debug!("Title {} rating is now {:?}", title_id, rating);
    Ok(rating)
}
