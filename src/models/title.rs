// src/models/title.rs

use chrono::Datelike;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;

/// Represents the 'titles' table joined with its category slug.
///
/// `genre` is filled from 'title_genres' after the row is loaded.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Title {
    pub id: i64,
    pub name: String,
    pub year: i64,
    pub description: Option<String>,
    #[sqlx(skip)]
    pub genre: Vec<String>,
    /// Slug of the category, `None` once the category is deleted.
    pub category: Option<String>,
    /// Rounded mean of review scores, `None` without reviews.
    pub rating: Option<i64>,
}

/// DTO for creating a title. Genres and category are given by slug.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTitleRequest {
    #[validate(length(
        min = 1,
        max = 256,
        message = "Name length must be between 1 and 256 characters."
    ))]
    pub name: String,

    #[validate(range(min = 0, message = "Year cannot be negative."))]
    pub year: i64,

    pub description: Option<String>,

    #[serde(default)]
    pub genre: Vec<String>,

    pub category: Option<String>,
}

/// DTO for updating a title. Fields are optional.
///
/// `category: null` clears the category; an absent key leaves it alone.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTitleRequest {
    #[validate(length(
        min = 1,
        max = 256,
        message = "Name length must be between 1 and 256 characters."
    ))]
    pub name: Option<String>,

    #[validate(range(min = 0, message = "Year cannot be negative."))]
    pub year: Option<i64>,

    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,

    pub genre: Option<Vec<String>>,

    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<String>>,
}

/// Marks a key that was present in the body, even when its value is null.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Query parameters for listing titles.
#[derive(Debug, Default, Deserialize)]
pub struct TitleFilter {
    /// Category slug.
    pub category: Option<String>,
    /// Genre slug.
    pub genre: Option<String>,
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    pub year: Option<i64>,
}

/// Release years may not lie in the future.
pub fn ensure_year_not_future(year: i64) -> Result<(), AppError> {
    let current = i64::from(chrono::Utc::now().year());
    if year > current {
        return Err(AppError::field(
            "year",
            format!("Year cannot be later than {}.", current),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn future_years_are_rejected() {
        let current = i64::from(chrono::Utc::now().year());
        assert!(ensure_year_not_future(1965).is_ok());
        assert!(ensure_year_not_future(current).is_ok());
        assert!(matches!(
            ensure_year_not_future(current + 1),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let cleared: UpdateTitleRequest = serde_json::from_str(r#"{"category": null}"#).unwrap();
        assert_eq!(cleared.category, Some(None));

        let untouched: UpdateTitleRequest = serde_json::from_str(r#"{"name": "Dune"}"#).unwrap();
        assert_eq!(untouched.category, None);
    }
}
