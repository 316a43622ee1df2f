use serde_json::Value;
use sqlx::SqlitePool;

use crate::{
    error::{AppError, AppResult},
    models::{
        GenreStat, GoldRecord, GoldView, KpiOverview, LanguageStat, MovieFinance, TopTitle,
        YearlyStat,
    },
};

/// SQL body of each view
///
/// Averages and ratios use SQLite `ROUND(x, 2)`. Every view has a total order
/// so repeated runs render identical output; remaining ties fall back to the
/// surrogate title id.
pub fn view_definition(view: GoldView) -> &'static str {
    match view {
        GoldView::KpiOverview => {
            r#"
            SELECT
              COUNT(*) AS title_count,
              ROUND(AVG(f.tmdb_score), 2) AS avg_tmdb_score,
              ROUND(AVG(f.popularity), 2) AS avg_popularity
            FROM fact_title_metrics f
            "#
        }
        GoldView::YearlyStats => {
            r#"
            SELECT f.release_year, COUNT(*) AS n,
                   ROUND(AVG(f.tmdb_score), 2) AS avg_score,
                   ROUND(AVG(f.popularity), 2) AS avg_pop
            FROM fact_title_metrics f
            WHERE f.release_year IS NOT NULL
            GROUP BY f.release_year
            ORDER BY f.release_year
            "#
        }
        GoldView::GenreStats => {
            r#"
            SELECT g.genre, COUNT(*) AS n,
                   ROUND(AVG(f.tmdb_score), 2) AS avg_score,
                   ROUND(AVG(f.popularity), 2) AS avg_pop
            FROM bridge_title_genre bg
            JOIN dim_title t ON t.title_id = bg.title_id
            JOIN fact_title_metrics f ON f.title_id = t.title_id
            JOIN dim_genre g ON g.genre = bg.genre
            GROUP BY g.genre
            ORDER BY g.genre
            "#
        }
        GoldView::LanguageStats => {
            r#"
            SELECT t.original_language, COUNT(*) AS n,
                   ROUND(AVG(f.tmdb_score), 2) AS avg_score
            FROM dim_title t
            JOIN fact_title_metrics f ON f.title_id = t.title_id
            GROUP BY t.original_language
            ORDER BY t.original_language
            "#
        }
        GoldView::TopTitles => {
            r#"
            SELECT t.title, t.type, f.tmdb_score, f.popularity, f.vote_count, f.release_year
            FROM dim_title t
            JOIN fact_title_metrics f ON f.title_id = t.title_id
            ORDER BY f.tmdb_score DESC, f.vote_count DESC, t.title_id ASC
            "#
        }
        GoldView::MovieFinance => {
            r#"
            SELECT t.title, f.budget, f.revenue,
                   ROUND(1.0 * f.revenue / f.budget, 2) AS roi
            FROM dim_title t
            JOIN fact_title_metrics f ON f.title_id = t.title_id
            WHERE t.type = 'Movie' AND f.budget > 0 AND f.revenue > 0
            ORDER BY roi DESC, t.title_id ASC
            "#
        }
    }
}

/// (Re)defines every gold view over the silver tables
///
/// Views are dropped and recreated so a changed definition always takes
/// effect.
pub async fn build_gold_views(pool: &SqlitePool) -> AppResult<()> {
    let mut tx = pool.begin().await?;
    for view in GoldView::ALL {
        sqlx::query(&format!("DROP VIEW IF EXISTS {}", view.name()))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!(
            "CREATE VIEW {} AS {}",
            view.name(),
            view_definition(view)
        ))
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::info!(views = GoldView::ALL.len(), "Gold views defined");
    Ok(())
}

/// Reads every row of one view
pub async fn fetch_rows<T: GoldRecord>(pool: &SqlitePool) -> AppResult<Vec<T>> {
    let columns = T::COLUMNS
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("SELECT {} FROM {}", columns, T::VIEW.name());
    let rows = sqlx::query_as::<_, T>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// One view rendered as CSV: a header line and one line per row
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTable {
    pub rows: usize,
    pub csv: Vec<u8>,
}

fn render_csv<T: GoldRecord>(rows: &[T]) -> AppResult<RenderedTable> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(T::COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    let csv = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush error: {}", e)))?;

    Ok(RenderedTable {
        rows: rows.len(),
        csv,
    })
}

async fn render_view<T: GoldRecord>(pool: &SqlitePool) -> AppResult<RenderedTable> {
    render_csv(&fetch_rows::<T>(pool).await?)
}

async fn view_json<T: GoldRecord>(pool: &SqlitePool) -> AppResult<Value> {
    Ok(serde_json::to_value(fetch_rows::<T>(pool).await?)?)
}

impl GoldView {
    /// Renders the view's current contents as CSV
    pub async fn render(self, pool: &SqlitePool) -> AppResult<RenderedTable> {
        match self {
            GoldView::KpiOverview => render_view::<KpiOverview>(pool).await,
            GoldView::YearlyStats => render_view::<YearlyStat>(pool).await,
            GoldView::GenreStats => render_view::<GenreStat>(pool).await,
            GoldView::LanguageStats => render_view::<LanguageStat>(pool).await,
            GoldView::TopTitles => render_view::<TopTitle>(pool).await,
            GoldView::MovieFinance => render_view::<MovieFinance>(pool).await,
        }
    }

    /// Reads the view's current contents as a JSON array of row objects
    pub async fn to_json(self, pool: &SqlitePool) -> AppResult<Value> {
        match self {
            GoldView::KpiOverview => view_json::<KpiOverview>(pool).await,
            GoldView::YearlyStats => view_json::<YearlyStat>(pool).await,
            GoldView::GenreStats => view_json::<GenreStat>(pool).await,
            GoldView::LanguageStats => view_json::<LanguageStat>(pool).await,
            GoldView::TopTitles => view_json::<TopTitle>(pool).await,
            GoldView::MovieFinance => view_json::<MovieFinance>(pool).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{create_memory_pool, ensure_schema},
        pipeline::silver::build_silver,
    };

    struct Staged<'a> {
        tmdb_id: i64,
        title: &'a str,
        kind: &'a str,
        year: Option<i64>,
        score: Option<f64>,
        popularity: f64,
        votes: i64,
        language: &'a str,
        genre: &'a str,
        budget: i64,
        revenue: i64,
    }

    impl Default for Staged<'_> {
        fn default() -> Self {
            Self {
                tmdb_id: 0,
                title: "",
                kind: "Movie",
                year: Some(2020),
                score: Some(7.0),
                popularity: 10.0,
                votes: 100,
                language: "en",
                genre: "",
                budget: 0,
                revenue: 0,
            }
        }
    }

    async fn setup(rows: &[Staged<'_>]) -> SqlitePool {
        let pool = create_memory_pool().await.unwrap();
        ensure_schema(&pool).await.unwrap();
        for row in rows {
            sqlx::query(
                "INSERT INTO stg_tmdb_all (tmdb_id, title, type, release_year, tmdb_score, popularity, vote_count, original_language, genre, budget, revenue) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(row.tmdb_id)
            .bind(row.title)
            .bind(row.kind)
            .bind(row.year)
            .bind(row.score)
            .bind(row.popularity)
            .bind(row.votes)
            .bind(row.language)
            .bind(row.genre)
            .bind(row.budget)
            .bind(row.revenue)
            .execute(&pool)
            .await
            .unwrap();
        }
        build_silver(&pool).await.unwrap();
        build_gold_views(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_kpi_overview_scenario() {
        let pool = setup(&[
            Staged { tmdb_id: 1, title: "A", score: Some(7.0), popularity: 10.0, ..Default::default() },
            Staged { tmdb_id: 2, title: "B", score: Some(9.0), popularity: 20.0, ..Default::default() },
        ])
        .await;

        let kpi = fetch_rows::<KpiOverview>(&pool).await.unwrap();
        assert_eq!(
            kpi,
            vec![KpiOverview {
                title_count: 2,
                avg_tmdb_score: Some(8.0),
                avg_popularity: Some(15.0),
            }]
        );
    }

    #[tokio::test]
    async fn test_kpi_overview_on_empty_silver() {
        let pool = setup(&[]).await;
        let kpi = fetch_rows::<KpiOverview>(&pool).await.unwrap();
        assert_eq!(kpi.len(), 1);
        assert_eq!(kpi[0].title_count, 0);
        assert_eq!(kpi[0].avg_tmdb_score, None);
    }

    #[tokio::test]
    async fn test_averages_round_to_two_decimals() {
        let pool = setup(&[
            Staged { tmdb_id: 1, title: "A", score: Some(7.0), ..Default::default() },
            Staged { tmdb_id: 2, title: "B", score: Some(8.0), ..Default::default() },
            Staged { tmdb_id: 3, title: "C", score: Some(8.0), ..Default::default() },
        ])
        .await;

        let years = fetch_rows::<YearlyStat>(&pool).await.unwrap();
        assert_eq!(years.len(), 1);
        assert_eq!(years[0].n, 3);
        assert_eq!(years[0].avg_score, Some(7.67));
    }

    #[tokio::test]
    async fn test_yearly_stats_skip_unknown_years() {
        let pool = setup(&[
            Staged { tmdb_id: 1, title: "Old", year: Some(1999), ..Default::default() },
            Staged { tmdb_id: 2, title: "Undated", year: None, ..Default::default() },
            Staged { tmdb_id: 3, title: "New", year: Some(2021), ..Default::default() },
        ])
        .await;

        let years: Vec<i64> = fetch_rows::<YearlyStat>(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|y| y.release_year)
            .collect();
        assert_eq!(years, vec![1999, 2021]);
    }

    #[tokio::test]
    async fn test_genre_and_language_stats() {
        let pool = setup(&[
            Staged { tmdb_id: 1, title: "A", genre: "Drama, Crime", score: Some(8.0), language: "en", ..Default::default() },
            Staged { tmdb_id: 2, title: "B", genre: "Drama", score: Some(6.0), language: "ko", ..Default::default() },
        ])
        .await;

        let genres = fetch_rows::<GenreStat>(&pool).await.unwrap();
        let summary: Vec<(&str, i64, Option<f64>)> = genres
            .iter()
            .map(|g| (g.genre.as_str(), g.n, g.avg_score))
            .collect();
        assert_eq!(summary, vec![("Crime", 1, Some(8.0)), ("Drama", 2, Some(7.0))]);

        let languages = fetch_rows::<LanguageStat>(&pool).await.unwrap();
        assert_eq!(languages.len(), 2);
        assert_eq!(languages[0].original_language.as_deref(), Some("en"));
        assert_eq!(languages[1].avg_score, Some(6.0));
    }

    #[tokio::test]
    async fn test_top_titles_tie_breaks() {
        let pool = setup(&[
            Staged { tmdb_id: 1, title: "Few votes", score: Some(8.0), votes: 10, ..Default::default() },
            Staged { tmdb_id: 2, title: "Best", score: Some(9.0), votes: 5, ..Default::default() },
            Staged { tmdb_id: 3, title: "Many votes", score: Some(8.0), votes: 500, ..Default::default() },
            Staged { tmdb_id: 4, title: "Twin", score: Some(8.0), votes: 10, ..Default::default() },
        ])
        .await;

        let titles: Vec<String> = fetch_rows::<TopTitle>(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["Best", "Many votes", "Few votes", "Twin"]);
    }

    #[tokio::test]
    async fn test_movie_finance_filters_and_orders() {
        let pool = setup(&[
            Staged { tmdb_id: 1, title: "Hit", budget: 100, revenue: 450, ..Default::default() },
            Staged { tmdb_id: 2, title: "No budget", budget: 0, revenue: 1_000_000, ..Default::default() },
            Staged { tmdb_id: 3, title: "Flop", budget: 300, revenue: 100, ..Default::default() },
            Staged { tmdb_id: 4, title: "Series", kind: "TV Show", budget: 10, revenue: 100, ..Default::default() },
            Staged { tmdb_id: 5, title: "Unreleased", budget: 50, revenue: 0, ..Default::default() },
        ])
        .await;

        let finance = fetch_rows::<MovieFinance>(&pool).await.unwrap();
        assert_eq!(
            finance,
            vec![
                MovieFinance { title: "Hit".to_string(), budget: 100, revenue: 450, roi: 4.5 },
                MovieFinance { title: "Flop".to_string(), budget: 300, revenue: 100, roi: 0.33 },
            ]
        );
    }

    #[tokio::test]
    async fn test_render_writes_header_for_empty_view() {
        let pool = setup(&[]).await;
        let table = GoldView::MovieFinance.render(&pool).await.unwrap();
        assert_eq!(table.rows, 0);
        assert_eq!(String::from_utf8(table.csv).unwrap(), "title,budget,revenue,roi\n");
    }

    #[tokio::test]
    async fn test_render_kpi_csv() {
        let pool = setup(&[
            Staged { tmdb_id: 1, title: "A", score: Some(7.0), popularity: 10.0, ..Default::default() },
            Staged { tmdb_id: 2, title: "B", score: Some(9.0), popularity: 20.0, ..Default::default() },
        ])
        .await;

        let table = GoldView::KpiOverview.render(&pool).await.unwrap();
        assert_eq!(
            String::from_utf8(table.csv).unwrap(),
            "title_count,avg_tmdb_score,avg_popularity\n2,8.0,15.0\n"
        );
    }

    #[tokio::test]
    async fn test_view_json_uses_column_names() {
        let pool = setup(&[Staged { tmdb_id: 1, title: "A", kind: "TV Show", ..Default::default() }]).await;
        let json = GoldView::TopTitles.to_json(&pool).await.unwrap();
        assert_eq!(json[0]["title"], "A");
        assert_eq!(json[0]["type"], "TV Show");
    }

    #[tokio::test]
    async fn test_missing_view_fails_to_render() {
        let pool = setup(&[]).await;
        sqlx::query("DROP VIEW vw_genre_stats").execute(&pool).await.unwrap();
        assert!(GoldView::GenreStats.render(&pool).await.is_err());
    }
}
