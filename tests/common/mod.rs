#![allow(dead_code)]

use content_etl::{db::create_memory_pool, models::RawContentRecord, pipeline::EtlPipeline};

pub const RAW_TABLE: &str = "netflix_content";

pub async fn pipeline() -> EtlPipeline {
    let pool = create_memory_pool().await.unwrap();
    EtlPipeline::new(pool, RAW_TABLE).unwrap()
}

pub fn record(tmdb_id: i64, title: &str, kind: &str, score: f64, popularity: f64) -> RawContentRecord {
    RawContentRecord {
        tmdb_id: Some(tmdb_id),
        title: Some(title.to_string()),
        content_type: Some(kind.to_string()),
        release_year: Some(2020),
        tmdb_score: Some(score),
        popularity: Some(popularity),
        vote_count: Some(100),
        original_language: Some("en".to_string()),
        ..Default::default()
    }
}

/// A small mixed batch: two movies with financials, one show, one untracked row
pub fn sample_batch() -> Vec<RawContentRecord> {
    let mut hit = record(1, "Hit", "Movie", 8.0, 30.0);
    hit.genre = Some("Action, Drama".to_string());
    hit.budget = Some(10_000_000);
    hit.revenue = Some(45_000_000);

    let mut flop = record(2, "Flop", "Movie", 5.5, 4.0);
    flop.genre = Some("Comedy".to_string());
    flop.budget = Some(30_000_000);
    flop.revenue = Some(10_000_000);

    let mut show = record(3, "Series", "TV Show", 8.5, 12.0);
    show.genre = Some("Drama".to_string());
    show.original_language = Some("de".to_string());

    let untracked = RawContentRecord {
        title: Some("No id".to_string()),
        content_type: Some("Movie".to_string()),
        ..Default::default()
    };

    vec![hit, flop, show, untracked]
}
