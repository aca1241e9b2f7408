// src/store/catalog.rs

use sqlx::SqlitePool;

use crate::{
    error::{AppError, is_unique_violation},
    models::catalog::CatalogEntry,
    store::like_pattern,
};

/// The two slug-addressed lookup tables share one shape and one set of queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    Categories,
    Genres,
}

impl Catalog {
    fn table(self) -> &'static str {
        match self {
            Catalog::Categories => "categories",
            Catalog::Genres => "genres",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Catalog::Categories => "Category",
            Catalog::Genres => "Genre",
        }
    }
}

/// Lists entries ordered by name, optionally filtered by a name substring.
pub async fn list(
    pool: &SqlitePool,
    catalog: Catalog,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<CatalogEntry>, i64), AppError> {
    let pattern = search.map(like_pattern);

    let count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\\')",
        catalog.table()
    ))
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    let entries = sqlx::query_as::<_, CatalogEntry>(&format!(
        r#"
        SELECT id, name, slug
        FROM {}
        WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\')
        ORDER BY name, id
        LIMIT ?2 OFFSET ?3
        "#,
        catalog.table()
    ))
    .bind(&pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list {}: {:?}", catalog.table(), e);
        AppError::from(e)
    })?;

    Ok((entries, count))
}

pub async fn create(
    pool: &SqlitePool,
    catalog: Catalog,
    name: &str,
    slug: &str,
) -> Result<CatalogEntry, AppError> {
    sqlx::query_as::<_, CatalogEntry>(&format!(
        "INSERT INTO {} (name, slug) VALUES (?, ?) RETURNING id, name, slug",
        catalog.table()
    ))
    .bind(name)
    .bind(slug)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::field(
                "slug",
                format!("{} with slug '{}' already exists.", catalog.label(), slug),
            )
        } else {
            tracing::error!("Failed to create {} entry: {:?}", catalog.table(), e);
            AppError::from(e)
        }
    })
}

/// Fails with `NotFound` unless an entry with `slug` exists.
pub async fn ensure_exists(pool: &SqlitePool, catalog: Catalog, slug: &str) -> Result<(), AppError> {
    sqlx::query_scalar::<_, i64>(&format!("SELECT id FROM {} WHERE slug = ?", catalog.table()))
        .bind(slug)
        .fetch_optional(pool)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(format!("{} not found", catalog.label())))
}

/// Deletes by slug. Titles keep existing: a deleted category is nulled on
/// them, a deleted genre drops out of their genre set.
pub async fn delete(pool: &SqlitePool, catalog: Catalog, slug: &str) -> Result<(), AppError> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE slug = ?", catalog.table()))
        .bind(slug)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete {} entry: {:?}", catalog.table(), e);
            AppError::from(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("{} not found", catalog.label())));
    }

    Ok(())
}
