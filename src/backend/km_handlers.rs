use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::backend::AppState;
use crate::database::db::metric_queries;
use crate::database::models::{KmMetric, KmMetricUpdate};
use crate::error::Result;

pub async fn list_metrics(State(state): State<AppState>) -> Result<Json<Vec<KmMetric>>> {
    Ok(Json(metric_queries::list_metrics(&state.db).await?))
}

pub async fn update_metrics(
    State(state): State<AppState>,
    Json(updates): Json<Vec<KmMetricUpdate>>,
) -> Result<Json<Value>> {
    let updated = metric_queries::update_metrics(&state.db, &updates).await?;
    Ok(Json(json!({ "message": "Metrics updated successfully", "updated": updated })))
}
