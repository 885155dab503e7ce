use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Datelike;

use crate::aggregation::aggregate;
use crate::backend::handlers::AsOf;
use crate::backend::AppState;
use crate::database::db::debt_queries;
use crate::database::models::{Debt, Kopeg, NewDebt, NewPayment, Payment};
use crate::error::Result;
use crate::reports::{self, ActiveDebt, DebtSummary, MonthlyDebtRow};

pub async fn get_debt_summary(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<DebtSummary>> {
    let debts = debt_queries::list_debts(&state.db).await?;
    let payments = debt_queries::list_payments(&state.db).await?;
    Ok(Json(reports::debt_summary(&debts, &payments, as_of.date())))
}

/// Scheduled installments against payments, per month of the `as_of` year.
pub async fn get_monthly_debt_realization(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<Vec<MonthlyDebtRow>>> {
    let debts = debt_queries::list_debts(&state.db).await?;
    let payments = debt_queries::list_payments(&state.db).await?;

    let records = reports::debt_schedule_records(&debts, &payments);
    let result = aggregate(&records, as_of.date().year(), |_| true);
    Ok(Json(reports::monthly_debt_realization(&result)))
}

pub async fn get_kopeg_list(State(state): State<AppState>) -> Result<Json<Vec<Kopeg>>> {
    Ok(Json(debt_queries::list_kopeg(&state.db).await?))
}

pub async fn get_active_debts(State(state): State<AppState>) -> Result<Json<Vec<ActiveDebt>>> {
    let debts = debt_queries::list_debts(&state.db).await?;
    let payments = debt_queries::list_payments(&state.db).await?;
    Ok(Json(reports::active_debts(&debts, &payments)))
}

/// The debt starts on the `as_of` date.
pub async fn add_debt(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
    Json(debt): Json<NewDebt>,
) -> Result<(StatusCode, Json<Debt>)> {
    let created = debt_queries::create_debt(&state.db, &debt, as_of.date()).await?;
    tracing::info!(debt_id = created.debt_id, kopeg = %created.kopeg_name, "debt added");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn record_payment(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
    Json(payment): Json<NewPayment>,
) -> Result<Json<Payment>> {
    Ok(Json(debt_queries::record_payment(&state.db, &payment, as_of.date()).await?))
}
