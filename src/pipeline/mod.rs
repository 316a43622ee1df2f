//! Layered ETL over the collected content.
//!
//! Raw store → staging snapshot → silver star schema → gold reporting views →
//! CSV export. Every stage rebuilds its output from scratch out of the
//! previous stage's current contents, so re-running is always safe.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    db::{ensure_schema, RawContentStore},
    error::{AppError, AppResult},
};

pub mod export;
pub mod genre;
pub mod gold;
pub mod silver;
pub mod staging;

pub use export::{DirectorySink, ExportReport, ExportSink, ExportStatus, ViewExport};
pub use silver::SilverReport;

/// Identifier attached to the logs of one pipeline invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of staging, normalization and view definition
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub run_id: RunId,
    pub collected_at: DateTime<Utc>,
    pub staged_rows: usize,
    pub silver: SilverReport,
}

/// Outcome of a full run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub stage: StageReport,
    pub export: ExportReport,
}

/// The ETL pipeline bound to one database and raw content table
#[derive(Debug, Clone)]
pub struct EtlPipeline {
    pool: SqlitePool,
    raw_store: RawContentStore,
}

impl EtlPipeline {
    pub fn new(pool: SqlitePool, raw_table: &str) -> AppResult<Self> {
        let raw_store = RawContentStore::new(pool.clone(), raw_table)?;
        Ok(Self { pool, raw_store })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn raw_store(&self) -> &RawContentStore {
        &self.raw_store
    }

    /// Loads staging, rebuilds the silver layer and (re)defines the gold views
    pub async fn run_stage(&self) -> AppResult<StageReport> {
        self.run_stage_at(Utc::now()).await
    }

    /// Same as [`run_stage`](Self::run_stage) with an explicit collection timestamp
    pub async fn run_stage_at(&self, collected_at: DateTime<Utc>) -> AppResult<StageReport> {
        let run_id = RunId::new();
        let span = tracing::info_span!("pipeline_stage", run_id = %run_id);

        async move {
            ensure_schema(&self.pool).await?;
            let staged_rows =
                staging::load_staging(&self.pool, &self.raw_store, collected_at).await?;
            let silver = silver::build_silver(&self.pool).await?;
            gold::build_gold_views(&self.pool).await?;

            Ok::<_, AppError>(StageReport {
                run_id,
                collected_at,
                staged_rows,
                silver,
            })
        }
        .instrument(span)
        .await
    }

    /// Writes every gold view through the sink, one outcome per view
    pub async fn export(&self, sink: &dyn ExportSink) -> ExportReport {
        export::export_views(&self.pool, sink).await
    }

    /// Stage then export
    pub async fn run(&self, sink: &dyn ExportSink) -> AppResult<RunReport> {
        let stage = self.run_stage().await?;
        let export = self
            .export(sink)
            .instrument(tracing::info_span!("pipeline_export", run_id = %stage.run_id))
            .await;

        tracing::info!(
            run_id = %stage.run_id,
            staged_rows = stage.staged_rows,
            titles = stage.silver.titles,
            exported = export.written(),
            "Pipeline run complete"
        );

        Ok(RunReport { stage, export })
    }
}
