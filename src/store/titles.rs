// src/store/titles.rs

use std::collections::{BTreeSet, HashMap};

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::{
    error::AppError,
    models::title::{CreateTitleRequest, Title, TitleFilter, UpdateTitleRequest},
    store::like_pattern,
};

const SELECT_TITLE: &str = r#"
    SELECT t.id, t.name, t.year, t.description, c.slug AS category, t.rating
    FROM titles t
    LEFT JOIN categories c ON c.id = t.category_id
"#;

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: &'a TitleFilter) {
    builder.push(" WHERE 1 = 1");

    if let Some(category) = &filter.category {
        builder.push(" AND c.slug = ");
        builder.push_bind(category);
    }

    if let Some(genre) = &filter.genre {
        builder.push(
            " AND EXISTS (SELECT 1 FROM title_genres tg JOIN genres g ON g.id = tg.genre_id \
             WHERE tg.title_id = t.id AND g.slug = ",
        );
        builder.push_bind(genre);
        builder.push(")");
    }

    if let Some(name) = &filter.name {
        builder.push(" AND t.name LIKE ");
        builder.push_bind(like_pattern(name));
        builder.push(" ESCAPE '\\'");
    }

    if let Some(year) = filter.year {
        builder.push(" AND t.year = ");
        builder.push_bind(year);
    }
}

/// Fills `genre` on each title with its genre slugs, ordered by genre name.
async fn attach_genres(conn: &mut SqliteConnection, titles: &mut [Title]) -> Result<(), AppError> {
    if titles.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT tg.title_id, g.slug FROM title_genres tg \
         JOIN genres g ON g.id = tg.genre_id WHERE tg.title_id IN (",
    );
    let mut separated = builder.separated(", ");
    for title in titles.iter() {
        separated.push_bind(title.id);
    }
    separated.push_unseparated(") ORDER BY g.name, g.slug");

    let rows: Vec<(i64, String)> = builder.build_query_as().fetch_all(&mut *conn).await?;

    let mut by_title: HashMap<i64, Vec<String>> = HashMap::new();
    for (title_id, slug) in rows {
        by_title.entry(title_id).or_default().push(slug);
    }
    for title in titles.iter_mut() {
        title.genre = by_title.remove(&title.id).unwrap_or_default();
    }

    Ok(())
}

pub async fn list(
    pool: &SqlitePool,
    filter: &TitleFilter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Title>, i64), AppError> {
    let mut conn = pool.acquire().await?;

    let mut count_builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT COUNT(*) FROM titles t LEFT JOIN categories c ON c.id = t.category_id",
    );
    push_filters(&mut count_builder, filter);
    let count: i64 = count_builder
        .build_query_scalar()
        .fetch_one(&mut *conn)
        .await?;

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_TITLE);
    push_filters(&mut builder, filter);
    builder.push(" ORDER BY t.name, t.id LIMIT ");
    builder.push_bind(limit);
    builder.push(" OFFSET ");
    builder.push_bind(offset);

    let mut titles: Vec<Title> = builder
        .build_query_as()
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list titles: {:?}", e);
            AppError::from(e)
        })?;

    attach_genres(&mut conn, &mut titles).await?;

    Ok((titles, count))
}

async fn fetch(conn: &mut SqliteConnection, id: i64) -> Result<Title, AppError> {
    let mut title = sqlx::query_as::<_, Title>(&format!("{} WHERE t.id = ?", SELECT_TITLE))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::NotFound("Title not found".to_string()))?;

    attach_genres(conn, std::slice::from_mut(&mut title)).await?;
    Ok(title)
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Title, AppError> {
    let mut conn = pool.acquire().await?;
    fetch(&mut conn, id).await
}

/// Fails with `NotFound` unless the title exists.
pub async fn ensure_exists(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM titles WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(|_| ())
        .ok_or(AppError::NotFound("Title not found".to_string()))
}

async fn resolve_category(conn: &mut SqliteConnection, slug: &str) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE slug = ?")
        .bind(slug)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::field("category", format!("Category '{}' does not exist.", slug)))
}

/// Maps genre slugs to ids. Every slug must resolve.
async fn resolve_genres(conn: &mut SqliteConnection, slugs: &[String]) -> Result<Vec<i64>, AppError> {
    let wanted: BTreeSet<&str> = slugs.iter().map(String::as_str).collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT id, slug FROM genres WHERE slug IN (");
    let mut separated = builder.separated(", ");
    for slug in &wanted {
        separated.push_bind(*slug);
    }
    separated.push_unseparated(")");

    let found: Vec<(i64, String)> = builder.build_query_as().fetch_all(&mut *conn).await?;

    if found.len() != wanted.len() {
        let known: BTreeSet<&str> = found.iter().map(|(_, slug)| slug.as_str()).collect();
        let missing: Vec<&str> = wanted.difference(&known).copied().collect();
        return Err(AppError::field(
            "genre",
            format!("Unknown genre slug(s): {}.", missing.join(", ")),
        ));
    }

    Ok(found.into_iter().map(|(id, _)| id).collect())
}

async fn replace_genres(conn: &mut SqliteConnection, title_id: i64, genre_ids: &[i64]) -> Result<(), AppError> {
    sqlx::query("DELETE FROM title_genres WHERE title_id = ?")
        .bind(title_id)
        .execute(&mut *conn)
        .await?;

    for genre_id in genre_ids {
        sqlx::query("INSERT INTO title_genres (title_id, genre_id) VALUES (?, ?)")
            .bind(title_id)
            .bind(genre_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

pub async fn create(pool: &SqlitePool, payload: &CreateTitleRequest) -> Result<Title, AppError> {
    let mut tx = super::begin_write(pool).await?;

    let category_id = match &payload.category {
        Some(slug) => Some(resolve_category(&mut tx, slug).await?),
        None => None,
    };
    let genre_ids = resolve_genres(&mut tx, &payload.genre).await?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO titles (name, year, description, category_id)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&payload.name)
    .bind(payload.year)
    .bind(&payload.description)
    .bind(category_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create title: {:?}", e);
        AppError::from(e)
    })?;

    replace_genres(&mut tx, id, &genre_ids).await?;

    let title = fetch(&mut tx, id).await?;
    tx.commit().await?;

    tracing::info!("Created title {} '{}'", title.id, title.name);
    Ok(title)
}

pub async fn update(pool: &SqlitePool, id: i64, payload: &UpdateTitleRequest) -> Result<Title, AppError> {
    let mut tx = super::begin_write(pool).await?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM titles WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Title not found".to_string()));
    }

    let category_id = match &payload.category {
        Some(Some(slug)) => Some(Some(resolve_category(&mut tx, slug).await?)),
        Some(None) => Some(None),
        None => None,
    };

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE titles SET ");
    let mut separated = builder.separated(", ");
    let mut touched = false;

    if let Some(name) = &payload.name {
        separated.push("name = ");
        separated.push_bind_unseparated(name);
        touched = true;
    }

    if let Some(year) = payload.year {
        separated.push("year = ");
        separated.push_bind_unseparated(year);
        touched = true;
    }

    if let Some(description) = &payload.description {
        separated.push("description = ");
        separated.push_bind_unseparated(description);
        touched = true;
    }

    if let Some(category_id) = category_id {
        separated.push("category_id = ");
        separated.push_bind_unseparated(category_id);
        touched = true;
    }

    if touched {
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.build().execute(&mut *tx).await.map_err(|e| {
            tracing::error!("Failed to update title: {:?}", e);
            AppError::from(e)
        })?;
    }

    if let Some(genre) = &payload.genre {
        let genre_ids = resolve_genres(&mut tx, genre).await?;
        replace_genres(&mut tx, id, &genre_ids).await?;
    }

    let title = fetch(&mut tx, id).await?;
    tx.commit().await?;

    Ok(title)
}

/// Deletes a title together with its reviews and their comments.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM titles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete title: {:?}", e);
            AppError::from(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Title not found".to_string()));
    }

    Ok(())
}
