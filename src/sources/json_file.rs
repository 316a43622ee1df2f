use std::path::PathBuf;

use super::ContentSource;
use crate::{error::AppResult, models::RawContentRecord};

/// Reads a collector dump: a JSON array of content records
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl ContentSource for JsonFileSource {
    async fn fetch_records(&self) -> AppResult<Vec<RawContentRecord>> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let records = serde_json::from_str(&contents)?;
        Ok(records)
    }

    fn name(&self) -> &'static str {
        "json_file"
    }
}
