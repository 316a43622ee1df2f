use std::path::PathBuf;

use serde::Serialize;
use sqlx::SqlitePool;

use crate::{error::AppResult, models::GoldView};

/// Destination for rendered gold views
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ExportSink: Send + Sync {
    /// Stores one rendered file and returns where it was written
    async fn write_table(&self, file_name: &str, contents: Vec<u8>) -> AppResult<PathBuf>;
}

/// Writes each view as a file inside one directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

#[async_trait::async_trait]
impl ExportSink for DirectorySink {
    async fn write_table(&self, file_name: &str, contents: Vec<u8>) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, contents).await?;
        Ok(path)
    }
}

/// What happened to one view during export
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportStatus {
    Written { path: PathBuf, rows: usize },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewExport {
    pub view: GoldView,
    #[serde(flatten)]
    pub status: ExportStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportReport {
    pub views: Vec<ViewExport>,
}

impl ExportReport {
    pub fn written(&self) -> usize {
        self.views
            .iter()
            .filter(|v| matches!(v.status, ExportStatus::Written { .. }))
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ViewExport> {
        self.views
            .iter()
            .filter(|v| matches!(v.status, ExportStatus::Skipped { .. }))
    }
}

/// Exports every gold view through the sink
///
/// A view that cannot be read or written is recorded as skipped and the
/// remaining views are still exported.
pub async fn export_views(pool: &SqlitePool, sink: &dyn ExportSink) -> ExportReport {
    let mut report = ExportReport::default();

    for view in GoldView::ALL {
        let status = match export_one(pool, sink, view).await {
            Ok((path, rows)) => {
                tracing::debug!(view = %view, rows, path = %path.display(), "View exported");
                ExportStatus::Written { path, rows }
            }
            Err(e) => {
                tracing::warn!(view = %view, error = %e, "View export skipped");
                ExportStatus::Skipped {
                    reason: e.to_string(),
                }
            }
        };
        report.views.push(ViewExport { view, status });
    }

    tracing::info!(
        written = report.written(),
        skipped = report.views.len() - report.written(),
        "Gold export finished"
    );

    report
}

async fn export_one(
    pool: &SqlitePool,
    sink: &dyn ExportSink,
    view: GoldView,
) -> AppResult<(PathBuf, usize)> {
    let table = view.render(pool).await?;
    let path = sink.write_table(&view.file_name(), table.csv).await?;
    Ok((path, table.rows))
}
