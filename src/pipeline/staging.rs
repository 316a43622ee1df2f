use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    db::RawContentStore,
    error::AppResult,
    models::StagingRecord,
};

const INSERT_BATCH: usize = 500;

/// Re-snapshots the raw content store into `stg_tmdb_all`
///
/// Every row is stamped with `collected_at`. The previous snapshot is deleted
/// in the same transaction. A missing or empty raw store leaves staging empty.
/// Returns the number of staged rows.
pub async fn load_staging(
    pool: &SqlitePool,
    raw_store: &RawContentStore,
    collected_at: DateTime<Utc>,
) -> AppResult<usize> {
    let staged: Vec<StagingRecord> = raw_store
        .load_all()
        .await?
        .iter()
        .map(|raw| StagingRecord::from_raw(raw, collected_at))
        .collect();

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM stg_tmdb_all")
        .execute(&mut *tx)
        .await?;

    for chunk in staged.chunks(INSERT_BATCH) {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO stg_tmdb_all (tmdb_id, title, type, release_year, tmdb_score, popularity, vote_count, original_language, adult, genre, runtime, budget, revenue, production_countries, collected_at) ",
        );
        qb.push_values(chunk, |mut b, record| {
            b.push_bind(record.tmdb_id)
                .push_bind(record.title.clone())
                .push_bind(record.content_type.map(|t| t.as_str()))
                .push_bind(record.release_year)
                .push_bind(record.tmdb_score)
                .push_bind(record.popularity)
                .push_bind(record.vote_count)
                .push_bind(record.original_language.clone())
                .push_bind(record.adult)
                .push_bind(record.genre.clone())
                .push_bind(record.runtime)
                .push_bind(record.budget)
                .push_bind(record.revenue)
                .push_bind(record.production_countries.clone())
                .push_bind(record.collected_at_text());
        });
        qb.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;

    tracing::info!(
        source = %raw_store.table(),
        staged = staged.len(),
        "Staging snapshot loaded"
    );

    Ok(staged.len())
}
