use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::aggregation::RecordKind;
use crate::backend::AppState;
use crate::database::db::queries;
use crate::database::models::{
    BudgetCode, BudgetCodeQuery, BudgetTarget, BudgetTargetQuery, NewBudgetCode, NewBudgetTarget,
    NewSale, Sale, SaleQuery,
};
use crate::error::{DashboardError, Result};

/*==========Budget Codes=========== */

pub async fn create_budget_code(
    State(state): State<AppState>,
    Json(code): Json<NewBudgetCode>,
) -> Result<(StatusCode, Json<BudgetCode>)> {
    if code.code.trim().is_empty() || code.name.trim().is_empty() {
        return Err(DashboardError::BadRequest("code and name are required".to_string()));
    }
    let created = queries::create_budget_code(&state.db, &code).await?;
    tracing::info!(code = %created.code, "budget code created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_budget_codes(
    State(state): State<AppState>,
    Query(filter): Query<BudgetCodeQuery>,
) -> Result<Json<Vec<BudgetCode>>> {
    Ok(Json(queries::list_budget_codes(&state.db, &filter).await?))
}

pub async fn update_budget_code(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(code): Json<NewBudgetCode>,
) -> Result<Json<BudgetCode>> {
    Ok(Json(queries::update_budget_code(&state.db, id, &code).await?))
}

pub async fn delete_budget_code(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>> {
    queries::delete_budget_code(&state.db, id).await?;
    Ok(Json(json!({ "message": "Budget code deleted" })))
}

/*==========Budget Targets=========== */

pub async fn create_budget_target(
    State(state): State<AppState>,
    Json(target): Json<NewBudgetTarget>,
) -> Result<(StatusCode, Json<BudgetTarget>)> {
    let created = queries::create_budget_target(&state.db, &target).await?;
    state.notifier.spawn_publish(state.db.clone());
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_budget_targets(
    State(state): State<AppState>,
    Query(filter): Query<BudgetTargetQuery>,
) -> Result<Json<Vec<BudgetTarget>>> {
    Ok(Json(queries::list_budget_targets(&state.db, &filter).await?))
}

#[derive(Debug, Clone, Deserialize)]
pub struct BudgetTargetUpdate {
    pub month: u32,
    pub year: i32,
    pub target_amount: Decimal,
}

pub async fn update_budget_target(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<BudgetTargetUpdate>,
) -> Result<Json<BudgetTarget>> {
    let updated =
        queries::update_budget_target(&state.db, id, update.month, update.year, update.target_amount).await?;
    state.notifier.spawn_publish(state.db.clone());
    Ok(Json(updated))
}

pub async fn delete_budget_target(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>> {
    queries::delete_budget_target(&state.db, id).await?;
    state.notifier.spawn_publish(state.db.clone());
    Ok(Json(json!({ "message": "Budget target deleted" })))
}

/*==========Realizations=========== */

/// Realization endpoints only write actual amounts; targets come from budgets.
fn require_actual_kind(sale: &NewSale) -> Result<()> {
    let kind: RecordKind = sale.kind.parse()?;
    if !kind.is_actual() {
        return Err(DashboardError::InvalidRecordKind(sale.kind.clone()));
    }
    Ok(())
}

pub async fn create_realization(
    State(state): State<AppState>,
    Json(sale): Json<NewSale>,
) -> Result<(StatusCode, Json<Sale>)> {
    require_actual_kind(&sale)?;
    let created = queries::create_sale(&state.db, &sale).await?;
    tracing::info!(sale_id = created.sale_id, kind = %created.kind, "realization recorded");

    state.notifier.spawn_publish(state.db.clone());
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_realizations(
    State(state): State<AppState>,
    Query(filter): Query<SaleQuery>,
) -> Result<Json<Vec<Sale>>> {
    Ok(Json(queries::list_realizations(&state.db, &filter).await?))
}

pub async fn get_realization(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Sale>> {
    Ok(Json(queries::get_sale(&state.db, id).await?))
}

pub async fn update_realization(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(sale): Json<NewSale>,
) -> Result<Json<Sale>> {
    require_actual_kind(&sale)?;
    let updated = queries::update_sale(&state.db, id, &sale).await?;

    state.notifier.spawn_publish(state.db.clone());
    Ok(Json(updated))
}

pub async fn delete_realization(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>> {
    queries::delete_sale(&state.db, id).await?;

    state.notifier.spawn_publish(state.db.clone());
    Ok(Json(json!({ "message": "Realization deleted" })))
}
