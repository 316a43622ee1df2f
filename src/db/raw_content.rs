use std::collections::HashSet;

use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::{schema::relation_exists, validate_identifier};
use crate::{
    error::AppResult,
    models::{
        fields::{parse_f64, parse_flag, parse_i64},
        RawContentRecord,
    },
};

/// Columns read from the raw store, in record order
const RAW_COLUMNS: [&str; 19] = [
    "tmdb_id",
    "title",
    "type",
    "genre",
    "release_year",
    "tmdb_score",
    "popularity",
    "vote_count",
    "overview",
    "original_language",
    "adult",
    "runtime",
    "budget",
    "revenue",
    "status",
    "tagline",
    "production_companies",
    "production_countries",
    "spoken_languages",
];

const INSERT_BATCH: usize = 500;

/// A raw row with every column read back as text
#[derive(Debug, FromRow)]
struct RawTextRow {
    tmdb_id: Option<String>,
    title: Option<String>,
    #[sqlx(rename = "type")]
    content_type: Option<String>,
    genre: Option<String>,
    release_year: Option<String>,
    tmdb_score: Option<String>,
    popularity: Option<String>,
    vote_count: Option<String>,
    overview: Option<String>,
    original_language: Option<String>,
    adult: Option<String>,
    runtime: Option<String>,
    budget: Option<String>,
    revenue: Option<String>,
    status: Option<String>,
    tagline: Option<String>,
    production_companies: Option<String>,
    production_countries: Option<String>,
    spoken_languages: Option<String>,
}

impl From<RawTextRow> for RawContentRecord {
    fn from(row: RawTextRow) -> Self {
        let int = |v: &Option<String>| v.as_deref().and_then(parse_i64);
        let float = |v: &Option<String>| v.as_deref().and_then(parse_f64);

        Self {
            tmdb_id: int(&row.tmdb_id),
            release_year: int(&row.release_year),
            tmdb_score: float(&row.tmdb_score),
            popularity: float(&row.popularity),
            vote_count: int(&row.vote_count),
            adult: row.adult.as_deref().and_then(parse_flag),
            runtime: int(&row.runtime),
            budget: int(&row.budget),
            revenue: int(&row.revenue),
            title: row.title,
            content_type: row.content_type,
            genre: row.genre,
            overview: row.overview,
            original_language: row.original_language,
            status: row.status,
            tagline: row.tagline,
            production_companies: row.production_companies,
            production_countries: row.production_countries,
            spoken_languages: row.spoken_languages,
        }
    }
}

/// The table of collected content records feeding the pipeline
#[derive(Debug, Clone)]
pub struct RawContentStore {
    pool: SqlitePool,
    table: String,
}

impl RawContentStore {
    pub fn new(pool: SqlitePool, table: impl Into<String>) -> AppResult<Self> {
        let table = table.into();
        validate_identifier(&table)?;
        Ok(Self { pool, table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub async fn exists(&self) -> AppResult<bool> {
        relation_exists(&self.pool, &self.table).await
    }

    /// Creates the raw table with the collectors' column layout
    pub async fn ensure_table(&self) -> AppResult<()> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{}" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                type TEXT,
                genre TEXT,
                release_year INTEGER,
                tmdb_score REAL,
                popularity REAL,
                vote_count INTEGER,
                overview TEXT,
                tmdb_id INTEGER,
                original_language TEXT,
                adult BOOLEAN,
                runtime INTEGER,
                budget INTEGER,
                revenue INTEGER,
                status TEXT,
                tagline TEXT,
                production_companies TEXT,
                production_countries TEXT,
                spoken_languages TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            self.table
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    /// Replaces the store's contents with a freshly collected batch
    ///
    /// Records sharing a `tmdb_id` keep only their first occurrence. Returns
    /// the number of rows written.
    pub async fn replace_all(&self, records: &[RawContentRecord]) -> AppResult<usize> {
        self.ensure_table().await?;

        let unique = dedup_by_tmdb_id(records);

        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!(r#"DELETE FROM "{}""#, self.table))
            .execute(&mut *tx)
            .await?;

        for chunk in unique.chunks(INSERT_BATCH) {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
                r#"INSERT INTO "{}" (tmdb_id, title, type, genre, release_year, tmdb_score, popularity, vote_count, overview, original_language, adult, runtime, budget, revenue, status, tagline, production_companies, production_countries, spoken_languages) "#,
                self.table
            ));
            qb.push_values(chunk, |mut b, record| {
                b.push_bind(record.tmdb_id)
                    .push_bind(record.title.clone().unwrap_or_default())
                    .push_bind(record.content_type.clone())
                    .push_bind(record.genre.clone())
                    .push_bind(record.release_year)
                    .push_bind(record.tmdb_score)
                    .push_bind(record.popularity)
                    .push_bind(record.vote_count)
                    .push_bind(record.overview.clone())
                    .push_bind(record.original_language.clone())
                    .push_bind(record.adult)
                    .push_bind(record.runtime)
                    .push_bind(record.budget)
                    .push_bind(record.revenue)
                    .push_bind(record.status.clone())
                    .push_bind(record.tagline.clone())
                    .push_bind(record.production_companies.clone())
                    .push_bind(record.production_countries.clone())
                    .push_bind(record.spoken_languages.clone());
            });
            qb.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::info!(
            table = %self.table,
            received = records.len(),
            stored = unique.len(),
            "Raw content store replaced"
        );

        Ok(unique.len())
    }

    /// Reads every record; a missing table reads as empty
    ///
    /// Columns absent from the table read as NULL, and every value is fetched
    /// as text so that malformed numbers degrade to `None` instead of failing.
    pub async fn load_all(&self) -> AppResult<Vec<RawContentRecord>> {
        if !self.exists().await? {
            tracing::warn!(table = %self.table, "Raw content table not found, nothing to load");
            return Ok(Vec::new());
        }

        let present: HashSet<String> =
            sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?)")
                .bind(&self.table)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .collect();

        let projection = RAW_COLUMNS
            .iter()
            .map(|column| {
                if present.contains(*column) {
                    format!(r#"CAST("{0}" AS TEXT) AS "{0}""#, column)
                } else {
                    format!(r#"NULL AS "{}""#, column)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(r#"SELECT {} FROM "{}""#, projection, self.table);
        let rows = sqlx::query_as::<_, RawTextRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(table = %self.table, rows = rows.len(), "Loaded raw content");

        Ok(rows.into_iter().map(RawContentRecord::from).collect())
    }
}

fn dedup_by_tmdb_id(records: &[RawContentRecord]) -> Vec<&RawContentRecord> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| match record.tmdb_id {
            Some(id) => seen.insert(id),
            None => true,
        })
        .collect()
}
