use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use super::fields::{lenient_f64, lenient_flag, lenient_i64, lenient_text};
use crate::error::AppError;

/// Type of content, stored as `Movie` / `TV Show`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "Movie")]
    Movie,
    #[serde(rename = "TV Show")]
    TvShow,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "Movie",
            ContentType::TvShow => "TV Show",
        }
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = AppError;

    /// Accepts the stored labels as well as the TMDB media types (`movie`, `tv`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" => Ok(ContentType::Movie),
            "tv show" | "tv" | "tv_show" | "tv_series" | "series" => Ok(ContentType::TvShow),
            other => Err(AppError::InvalidInput(format!(
                "Unknown content type: {}",
                other
            ))),
        }
    }
}

/// One collected content record, as written by the collectors
///
/// Every field is optional: the collectors fill what the upstream API returned
/// and malformed values are dropped to `None` on the way in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawContentRecord {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub tmdb_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_text")]
    pub content_type: Option<String>,
    /// Comma-separated genre names
    #[serde(default, deserialize_with = "lenient_text")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub release_year: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub tmdb_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub popularity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub vote_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub original_language: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub adult: Option<bool>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub runtime: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub budget: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub revenue: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tagline: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub production_companies: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub production_countries: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub spoken_languages: Option<String>,
}

impl RawContentRecord {
    /// Parsed content type; unknown labels yield `None`
    pub fn kind(&self) -> Option<ContentType> {
        self.content_type.as_deref().and_then(|t| t.parse().ok())
    }
}

/// A raw record projected onto the staging columns
#[derive(Debug, Clone, PartialEq)]
pub struct StagingRecord {
    pub tmdb_id: Option<i64>,
    pub title: Option<String>,
    pub content_type: Option<ContentType>,
    pub release_year: Option<i64>,
    pub tmdb_score: Option<f64>,
    pub popularity: Option<f64>,
    pub vote_count: Option<i64>,
    pub original_language: Option<String>,
    pub adult: Option<bool>,
    pub genre: Option<String>,
    pub runtime: Option<i64>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub production_countries: Option<String>,
    pub collected_at: DateTime<Utc>,
}

impl StagingRecord {
    pub fn from_raw(raw: &RawContentRecord, collected_at: DateTime<Utc>) -> Self {
        Self {
            tmdb_id: raw.tmdb_id,
            title: raw.title.clone(),
            content_type: raw.kind(),
            release_year: raw.release_year,
            tmdb_score: raw.tmdb_score,
            popularity: raw.popularity,
            vote_count: raw.vote_count,
            original_language: raw.original_language.clone(),
            adult: raw.adult,
            genre: raw.genre.clone(),
            runtime: raw.runtime,
            budget: raw.budget,
            revenue: raw.revenue,
            production_countries: raw.production_countries.clone(),
            collected_at,
        }
    }

    /// Collection timestamp in the stored text form
    pub fn collected_at_text(&self) -> String {
        self.collected_at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}
