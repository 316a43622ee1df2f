use std::str::FromStr;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    analysis::{summarize, CollectionSummary},
    db::schema::relation_exists,
    error::{AppError, AppResult},
    models::GoldView,
    pipeline::RunReport,
};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct ViewInfo {
    pub name: &'static str,
    pub file_name: String,
    pub built: bool,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Lists the gold views and whether each is currently defined
pub async fn list_views(State(state): State<AppState>) -> AppResult<Json<Vec<ViewInfo>>> {
    let pool = state.pipeline.pool();
    let mut views = Vec::with_capacity(GoldView::ALL.len());
    for view in GoldView::ALL {
        views.push(ViewInfo {
            name: view.name(),
            file_name: view.file_name(),
            built: relation_exists(pool, view.name()).await?,
        });
    }
    Ok(Json(views))
}

/// Rows of one gold view as JSON objects
pub async fn get_view(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<Value>> {
    let view = GoldView::from_str(&name)?;
    let pool = state.pipeline.pool();

    if !relation_exists(pool, view.name()).await? {
        return Err(AppError::NotFound(format!(
            "View {} has not been built yet",
            view
        )));
    }

    Ok(Json(view.to_json(pool).await?))
}

/// Descriptive statistics over the raw store
pub async fn get_summary(State(state): State<AppState>) -> AppResult<Json<CollectionSummary>> {
    let records = state.pipeline.raw_store().load_all().await?;
    Ok(Json(summarize(&records)))
}

/// Stages the raw store and exports every view
pub async fn run_pipeline(State(state): State<AppState>) -> AppResult<Json<RunReport>> {
    let _guard = state.run_lock.lock().await;
    let report = state.pipeline.run(state.sink.as_ref()).await?;
    Ok(Json(report))
}
