use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{
    models::{ContentType, RawContentRecord},
    pipeline::genre::split_genres,
};

const TOP_LANGUAGES: usize = 10;
const TOP_GENRES: usize = 10;
const TOP_TITLES: usize = 5;

/// Descriptive statistics over the collected raw content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionSummary {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub release_years: Option<YearRange>,
    pub tmdb_score: Option<NumericStats>,
    pub popularity: Option<NumericStats>,
    pub top_languages: Vec<LabelCount>,
    pub top_genres: Vec<LabelCount>,
    pub movie_runtime: Option<NumericStats>,
    pub movie_budget: Option<BudgetStats>,
    pub top_titles: Vec<TopContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearRange {
    pub earliest: i64,
    pub latest: i64,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl NumericStats {
    /// `None` for an empty sample
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let len = values.len();
        let mean = values.iter().sum::<f64>() / len as f64;
        let median = if len % 2 == 0 {
            (values[len / 2 - 1] + values[len / 2]) / 2.0
        } else {
            values[len / 2]
        };

        Some(Self {
            mean,
            median,
            min: values[0],
            max: values[len - 1],
        })
    }
}

/// Budgets of movies that report one (budget > 0)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStats {
    pub movies_with_budget: usize,
    pub mean: f64,
    pub max: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopContent {
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub tmdb_score: f64,
    pub release_year: Option<i64>,
    pub genre: Option<String>,
}

/// Most frequent labels first; equal counts are ordered by label
fn top_counts<'a>(labels: impl Iterator<Item = &'a str>, limit: usize) -> Vec<LabelCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }

    let mut counts: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    counts.truncate(limit);
    counts
}

/// Summarizes a collected batch
pub fn summarize(records: &[RawContentRecord]) -> CollectionSummary {
    let mut by_type = BTreeMap::new();
    for record in records {
        let label = record.kind().map_or("Unknown", |kind| kind.as_str());
        *by_type.entry(label.to_string()).or_default() += 1;
    }

    let years: Vec<i64> = records.iter().filter_map(|r| r.release_year).collect();
    let release_years = match (years.iter().min(), years.iter().max()) {
        (Some(&earliest), Some(&latest)) => Some(YearRange {
            earliest,
            latest,
            mean: years.iter().map(|&y| y as f64).sum::<f64>() / years.len() as f64,
        }),
        _ => None,
    };

    let tmdb_score = NumericStats::from_values(records.iter().filter_map(|r| r.tmdb_score).collect());
    let popularity = NumericStats::from_values(records.iter().filter_map(|r| r.popularity).collect());

    let top_languages = top_counts(
        records
            .iter()
            .filter_map(|r| r.original_language.as_deref()),
        TOP_LANGUAGES,
    );

    let genres: Vec<String> = records
        .iter()
        .flat_map(|r| split_genres(r.genre.as_deref()))
        .collect();
    let top_genres = top_counts(genres.iter().map(String::as_str), TOP_GENRES);

    let movies: Vec<&RawContentRecord> = records
        .iter()
        .filter(|r| r.kind() == Some(ContentType::Movie))
        .collect();

    let movie_runtime =
        NumericStats::from_values(movies.iter().filter_map(|r| r.runtime).map(|v| v as f64).collect());

    let budgets: Vec<i64> = movies
        .iter()
        .filter_map(|r| r.budget)
        .filter(|b| *b > 0)
        .collect();
    let movie_budget = budgets.iter().max().map(|&max| BudgetStats {
        movies_with_budget: budgets.len(),
        mean: budgets.iter().map(|&b| b as f64).sum::<f64>() / budgets.len() as f64,
        max,
    });

    let mut scored: Vec<(&RawContentRecord, f64)> = records
        .iter()
        .filter_map(|r| r.tmdb_score.map(|s| (r, s)))
        .collect();
    // Stable sort keeps collection order among equal scores
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    let top_titles = scored
        .into_iter()
        .take(TOP_TITLES)
        .map(|(r, score)| TopContent {
            title: r.title.clone().unwrap_or_default(),
            content_type: r.content_type.clone(),
            tmdb_score: score,
            release_year: r.release_year,
            genre: r.genre.clone(),
        })
        .collect();

    CollectionSummary {
        total: records.len(),
        by_type,
        release_years,
        tmdb_score,
        popularity,
        top_languages,
        top_genres,
        movie_runtime,
        movie_budget,
        top_titles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, score: f64, year: i64, genre: &str) -> RawContentRecord {
        RawContentRecord {
            title: Some(title.to_string()),
            content_type: Some("Movie".to_string()),
            tmdb_score: Some(score),
            release_year: Some(year),
            genre: Some(genre.to_string()),
            original_language: Some("en".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_batch() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert!(summary.by_type.is_empty());
        assert_eq!(summary.release_years, None);
        assert_eq!(summary.tmdb_score, None);
        assert_eq!(summary.movie_budget, None);
        assert!(summary.top_titles.is_empty());
    }

    #[test]
    fn test_numeric_stats_median() {
        let odd = NumericStats::from_values(vec![3.0, 1.0, 2.0]).unwrap();
        assert_eq!(odd.median, 2.0);
        assert_eq!(odd.min, 1.0);
        assert_eq!(odd.max, 3.0);

        let even = NumericStats::from_values(vec![4.0, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(even.median, 2.5);
        assert_eq!(even.mean, 2.5);
    }

    #[test]
    fn test_summarize_batch() {
        let mut heat = movie("Heat", 7.9, 1995, "Action, Crime, Drama");
        heat.runtime = Some(170);
        heat.budget = Some(60_000_000);
        let mut alien = movie("Alien", 8.1, 1979, "Horror, Science Fiction");
        alien.runtime = Some(117);
        alien.budget = Some(0);
        let mut dark = RawContentRecord {
            title: Some("Dark".to_string()),
            content_type: Some("TV Show".to_string()),
            tmdb_score: Some(8.4),
            release_year: Some(2017),
            genre: Some("Drama,Mystery".to_string()),
            original_language: Some("de".to_string()),
            ..Default::default()
        };
        dark.runtime = Some(60);

        let summary = summarize(&[heat, alien, dark]);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_type.get("Movie"), Some(&2));
        assert_eq!(summary.by_type.get("TV Show"), Some(&1));

        let years = summary.release_years.unwrap();
        assert_eq!((years.earliest, years.latest), (1979, 2017));

        assert_eq!(
            summary.top_languages,
            vec![
                LabelCount { label: "en".to_string(), count: 2 },
                LabelCount { label: "de".to_string(), count: 1 },
            ]
        );
        assert_eq!(summary.top_genres[0], LabelCount { label: "Drama".to_string(), count: 2 });

        // Only movies count towards runtime, only positive budgets towards budget
        let runtime = summary.movie_runtime.unwrap();
        assert_eq!(runtime.max, 170.0);
        assert_eq!(runtime.min, 117.0);
        let budget = summary.movie_budget.unwrap();
        assert_eq!(budget.movies_with_budget, 1);
        assert_eq!(budget.max, 60_000_000);

        let top: Vec<&str> = summary.top_titles.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(top, vec!["Dark", "Alien", "Heat"]);
    }

    #[test]
    fn test_types_are_counted_by_normalized_kind() {
        let records: Vec<RawContentRecord> = ["movie", "Movie", "tv", "TV Show", "documentary"]
            .into_iter()
            .map(|kind| RawContentRecord {
                content_type: Some(kind.to_string()),
                ..Default::default()
            })
            .chain(std::iter::once(RawContentRecord::default()))
            .collect();

        let summary = summarize(&records);
        assert_eq!(summary.by_type.len(), 3);
        assert_eq!(summary.by_type.get("Movie"), Some(&2));
        assert_eq!(summary.by_type.get("TV Show"), Some(&2));
        assert_eq!(summary.by_type.get("Unknown"), Some(&2));
    }

    #[test]
    fn test_huge_collected_numbers_do_not_overflow() {
        let records: Vec<RawContentRecord> = serde_json::from_value(serde_json::json!([
            {"tmdb_id": 1, "title": "Big", "type": "Movie", "budget": 1e30, "release_year": "9e99"},
            {"tmdb_id": 2, "title": "Bigger", "type": "Movie", "budget": "5e20", "release_year": 2001},
            {"tmdb_id": 3, "title": "Max", "type": "Movie", "budget": i64::MAX, "release_year": 2002},
            {"tmdb_id": 4, "title": "Max again", "type": "Movie", "budget": i64::MAX, "release_year": 2003}
        ]))
        .unwrap();
        assert_eq!(records[0].budget, None);
        assert_eq!(records[0].release_year, None);
        assert_eq!(records[1].budget, None);

        let summary = summarize(&records);
        let budget = summary.movie_budget.unwrap();
        assert_eq!(budget.movies_with_budget, 2);
        assert_eq!(budget.max, i64::MAX);
        assert_eq!(summary.release_years.unwrap().earliest, 2001);
    }
}
