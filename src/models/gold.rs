use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

/// The reporting views of the gold layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoldView {
    #[serde(rename = "vw_kpi_overview")]
    KpiOverview,
    #[serde(rename = "vw_yearly_stats")]
    YearlyStats,
    #[serde(rename = "vw_genre_stats")]
    GenreStats,
    #[serde(rename = "vw_language_stats")]
    LanguageStats,
    #[serde(rename = "vw_top_titles")]
    TopTitles,
    #[serde(rename = "vw_movie_finance")]
    MovieFinance,
}

impl GoldView {
    /// All views in export order
    pub const ALL: [GoldView; 6] = [
        GoldView::KpiOverview,
        GoldView::YearlyStats,
        GoldView::GenreStats,
        GoldView::LanguageStats,
        GoldView::TopTitles,
        GoldView::MovieFinance,
    ];

    /// Name of the SQL view, also used for the export file name
    pub fn name(&self) -> &'static str {
        match self {
            GoldView::KpiOverview => "vw_kpi_overview",
            GoldView::YearlyStats => "vw_yearly_stats",
            GoldView::GenreStats => "vw_genre_stats",
            GoldView::LanguageStats => "vw_language_stats",
            GoldView::TopTitles => "vw_top_titles",
            GoldView::MovieFinance => "vw_movie_finance",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name())
    }
}

impl Display for GoldView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for GoldView {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GoldView::ALL
            .into_iter()
            .find(|view| view.name() == s)
            .ok_or_else(|| AppError::NotFound(format!("Unknown view: {}", s)))
    }
}

/// A row type read from one gold view
///
/// `COLUMNS` is the view's column order; it is used both to select the row and
/// as the CSV header, so it must match the struct's field order.
pub trait GoldRecord:
    Serialize + for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static
{
    const VIEW: GoldView;
    const COLUMNS: &'static [&'static str];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct KpiOverview {
    pub title_count: i64,
    pub avg_tmdb_score: Option<f64>,
    pub avg_popularity: Option<f64>,
}

impl GoldRecord for KpiOverview {
    const VIEW: GoldView = GoldView::KpiOverview;
    const COLUMNS: &'static [&'static str] = &["title_count", "avg_tmdb_score", "avg_popularity"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct YearlyStat {
    pub release_year: i64,
    pub n: i64,
    pub avg_score: Option<f64>,
    pub avg_pop: Option<f64>,
}

impl GoldRecord for YearlyStat {
    const VIEW: GoldView = GoldView::YearlyStats;
    const COLUMNS: &'static [&'static str] = &["release_year", "n", "avg_score", "avg_pop"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GenreStat {
    pub genre: String,
    pub n: i64,
    pub avg_score: Option<f64>,
    pub avg_pop: Option<f64>,
}

impl GoldRecord for GenreStat {
    const VIEW: GoldView = GoldView::GenreStats;
    const COLUMNS: &'static [&'static str] = &["genre", "n", "avg_score", "avg_pop"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LanguageStat {
    pub original_language: Option<String>,
    pub n: i64,
    pub avg_score: Option<f64>,
}

impl GoldRecord for LanguageStat {
    const VIEW: GoldView = GoldView::LanguageStats;
    const COLUMNS: &'static [&'static str] = &["original_language", "n", "avg_score"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TopTitle {
    pub title: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub content_type: Option<String>,
    pub tmdb_score: Option<f64>,
    pub popularity: Option<f64>,
    pub vote_count: Option<i64>,
    pub release_year: Option<i64>,
}

impl GoldRecord for TopTitle {
    const VIEW: GoldView = GoldView::TopTitles;
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "type",
        "tmdb_score",
        "popularity",
        "vote_count",
        "release_year",
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MovieFinance {
    pub title: String,
    pub budget: i64,
    pub revenue: i64,
    pub roi: f64,
}

impl GoldRecord for MovieFinance {
    const VIEW: GoldView = GoldView::MovieFinance;
    const COLUMNS: &'static [&'static str] = &["title", "budget", "revenue", "roi"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_names_round_trip() {
        for view in GoldView::ALL {
            assert_eq!(view.name().parse::<GoldView>().unwrap(), view);
            assert_eq!(
                serde_json::to_value(view).unwrap(),
                serde_json::json!(view.name())
            );
        }
    }

    #[test]
    fn test_unknown_view_is_not_found() {
        let err = "vw_nope".parse::<GoldView>().unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(GoldView::MovieFinance.file_name(), "vw_movie_finance.csv");
    }
}
