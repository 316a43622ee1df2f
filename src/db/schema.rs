use sqlx::SqlitePool;

use crate::error::AppResult;

/// Staging snapshot of the raw content store
pub const STAGING_TABLE: &str = "stg_tmdb_all";

const SCHEMA: [&str; 5] = [
    r#"
    CREATE TABLE IF NOT EXISTS stg_tmdb_all (
        tmdb_id INTEGER,
        title TEXT,
        type TEXT,
        release_year INTEGER,
        tmdb_score REAL,
        popularity REAL,
        vote_count INTEGER,
        original_language TEXT,
        adult INTEGER,
        genre TEXT,
        runtime INTEGER,
        budget INTEGER,
        revenue INTEGER,
        production_countries TEXT,
        collected_at TEXT
    )
    "#,
    // Plain INTEGER PRIMARY KEY so surrogate ids restart at 1 after a full delete
    r#"
    CREATE TABLE IF NOT EXISTS dim_title (
        title_id INTEGER PRIMARY KEY,
        tmdb_id INTEGER UNIQUE NOT NULL,
        title TEXT NOT NULL,
        type TEXT,
        release_year INTEGER,
        original_language TEXT,
        adult INTEGER DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dim_genre (
        genre TEXT PRIMARY KEY
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bridge_title_genre (
        title_id INTEGER,
        genre TEXT,
        PRIMARY KEY (title_id, genre)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS fact_title_metrics (
        title_id INTEGER PRIMARY KEY,
        tmdb_score REAL,
        popularity REAL,
        vote_count INTEGER,
        runtime INTEGER,
        budget INTEGER,
        revenue INTEGER,
        release_year INTEGER
    )
    "#,
];

/// Creates the staging and silver tables if they do not exist yet
pub async fn ensure_schema(pool: &SqlitePool) -> AppResult<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Returns whether a table or view with the given name exists
pub async fn relation_exists(pool: &SqlitePool, name: &str) -> AppResult<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?)",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}
