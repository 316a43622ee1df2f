//! Parsing of the free-text genre column.
//!
//! Collectors store genres as one comma-separated string ("Action, Comedy").
//! Tokens are trimmed and empty tokens dropped, so "Comedy" and " Comedy "
//! always name the same genre.

use std::collections::{BTreeSet, HashSet};

/// Splits a raw genre string into trimmed, non-empty, distinct tokens
///
/// Token order follows the input.
pub fn split_genres(raw: Option<&str>) -> Vec<String> {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Vec::new(),
    };

    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect()
}

/// One title↔genre association
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TitleGenre {
    pub title_id: i64,
    pub genre: String,
}

/// Genre dimension and bridge rows derived from (title, genre string) pairs
#[derive(Debug, Default, PartialEq)]
pub struct GenreIndex {
    /// Distinct genres, sorted
    pub genres: BTreeSet<String>,
    pub links: Vec<TitleGenre>,
}

impl GenreIndex {
    pub fn build<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (i64, Option<String>)>,
    {
        let mut index = GenreIndex::default();
        let mut linked = HashSet::new();

        for (title_id, raw) in rows {
            for genre in split_genres(raw.as_deref()) {
                if linked.insert((title_id, genre.clone())) {
                    index.genres.insert(genre.clone());
                    index.links.push(TitleGenre { title_id, genre });
                }
            }
        }

        index
    }
}
