// src/models/catalog.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+\z").expect("slug pattern is valid"));

/// A row of either lookup table ('categories' or 'genres').
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CatalogEntry {
    #[serde(skip)]
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// DTO for creating a category or a genre.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCatalogEntryRequest {
    #[validate(length(
        min = 1,
        max = 256,
        message = "Name length must be between 1 and 256 characters."
    ))]
    pub name: String,

    #[validate(
        length(min = 1, max = 50, message = "Slug length must be between 1 and 50 characters."),
        regex(path = *SLUG_RE, message = "Slug may contain only latin letters, digits, '-' and '_'.")
    )]
    pub slug: String,
}

/// Query parameters for listing categories or genres.
#[derive(Debug, Deserialize)]
pub struct CatalogListParams {
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_pattern() {
        let ok = CreateCatalogEntryRequest {
            name: "Science fiction".into(),
            slug: "sci-fi_2".into(),
        };
        assert!(ok.validate().is_ok());

        for bad in ["sci fi", "жанр", "", "a/b"] {
            let req = CreateCatalogEntryRequest {
                name: "x".into(),
                slug: bad.into(),
            };
            assert!(req.validate().is_err(), "{:?} should be rejected", bad);
        }
    }
}
