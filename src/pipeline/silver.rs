use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::genre::GenreIndex;
use crate::error::AppResult;

const INSERT_BATCH: usize = 1000;

/// First staging row of every distinct `tmdb_id`
///
/// A snapshot may repeat an id; the earliest row is the one normalized into
/// the dimension and the facts.
const CANONICAL_ROWS: &str =
    "SELECT MIN(rowid) FROM stg_tmdb_all WHERE tmdb_id IS NOT NULL GROUP BY tmdb_id";

/// Row counts produced by one silver build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SilverReport {
    pub titles: u64,
    pub facts: u64,
    pub genres: u64,
    pub title_genres: u64,
}

/// Rebuilds the title dimension, metrics fact, genre dimension and bridge
pub async fn build_silver(pool: &SqlitePool) -> AppResult<SilverReport> {
    let titles = build_title_dimension(pool).await?;
    let facts = build_title_metrics(pool).await?;
    let (genres, title_genres) = build_genres(pool).await?;

    let report = SilverReport {
        titles,
        facts,
        genres,
        title_genres,
    };

    tracing::info!(
        titles = report.titles,
        facts = report.facts,
        genres = report.genres,
        title_genres = report.title_genres,
        "Silver layer rebuilt"
    );

    Ok(report)
}

/// Replaces `dim_title`; surrogate ids follow staging order starting at 1
pub async fn build_title_dimension(pool: &SqlitePool) -> AppResult<u64> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM dim_title").execute(&mut *tx).await?;

    let inserted = sqlx::query(&format!(
        r#"
        INSERT INTO dim_title (tmdb_id, title, type, release_year, original_language, adult)
        SELECT tmdb_id, COALESCE(title, ''), type, release_year, original_language, COALESCE(adult, 0)
        FROM stg_tmdb_all
        WHERE rowid IN ({CANONICAL_ROWS})
        ORDER BY rowid
        "#
    ))
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;
    Ok(inserted)
}

/// Replaces `fact_title_metrics` from staging joined to `dim_title`
pub async fn build_title_metrics(pool: &SqlitePool) -> AppResult<u64> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM fact_title_metrics")
        .execute(&mut *tx)
        .await?;

    let inserted = sqlx::query(&format!(
        r#"
        INSERT INTO fact_title_metrics
            (title_id, tmdb_score, popularity, vote_count, runtime, budget, revenue, release_year)
        SELECT d.title_id, s.tmdb_score, s.popularity, s.vote_count,
               COALESCE(s.runtime, 0), COALESCE(s.budget, 0), COALESCE(s.revenue, 0),
               s.release_year
        FROM stg_tmdb_all s
        JOIN dim_title d ON d.tmdb_id = s.tmdb_id
        WHERE s.rowid IN ({CANONICAL_ROWS})
        ORDER BY d.title_id
        "#
    ))
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;
    Ok(inserted)
}

/// Replaces `dim_genre` and `bridge_title_genre` from the staged genre strings
///
/// Unlike the title and metric rows, genres are taken from every staged row
/// of a title, so repeated ids contribute the union of their genres.
/// Returns (genre count, bridge row count).
pub async fn build_genres(pool: &SqlitePool) -> AppResult<(u64, u64)> {
    let rows: Vec<(i64, Option<String>)> = sqlx::query_as(
        r#"
        SELECT d.title_id, s.genre
        FROM stg_tmdb_all s
        JOIN dim_title d ON d.tmdb_id = s.tmdb_id
        ORDER BY d.title_id, s.rowid
        "#,
    )
    .fetch_all(pool)
    .await?;

    let index = GenreIndex::build(rows);

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM dim_genre").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM bridge_title_genre")
        .execute(&mut *tx)
        .await?;

    let genres: Vec<&String> = index.genres.iter().collect();
    for chunk in genres.chunks(INSERT_BATCH) {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("INSERT INTO dim_genre (genre) ");
        qb.push_values(chunk, |mut b, genre| {
            b.push_bind(genre.as_str());
        });
        qb.build().execute(&mut *tx).await?;
    }

    for chunk in index.links.chunks(INSERT_BATCH) {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("INSERT INTO bridge_title_genre (title_id, genre) ");
        qb.push_values(chunk, |mut b, link| {
            b.push_bind(link.title_id).push_bind(link.genre.as_str());
        });
        qb.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;

    Ok((index.genres.len() as u64, index.links.len() as u64))
}
