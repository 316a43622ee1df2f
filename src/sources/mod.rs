//! Producers of raw content records.
//!
//! The collectors talking to TMDB/OMDb/JustWatch live outside this crate; they
//! hand over their output as a batch of [`RawContentRecord`]s which is then
//! written to the raw content store.

use crate::{
    db::RawContentStore,
    error::AppResult,
    models::RawContentRecord,
};

pub mod json_file;

pub use json_file::JsonFileSource;

/// A source of collected content records
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the full collected batch
    async fn fetch_records(&self) -> AppResult<Vec<RawContentRecord>>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// Replaces the raw store's contents with everything the source produces
///
/// Returns the number of records stored after de-duplication.
pub async fn collect_into(source: &dyn ContentSource, store: &RawContentStore) -> AppResult<usize> {
    let records = source.fetch_records().await?;
    tracing::info!(
        source = source.name(),
        records = records.len(),
        "Fetched content records"
    );
    store.replace_all(&records).await
}
