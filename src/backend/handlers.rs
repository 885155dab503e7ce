use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{Pool, Sqlite};

use crate::aggregation::{aggregate_expenses, aggregate_revenue, progress, Progress};
use crate::backend::AppState;
use crate::database::db::queries;
use crate::error::Result;
use crate::reports::{
    self, CollectionSummary, DashboardPayload, ExpensesSummary, MonthComparison, MonthPoint,
    ProductComparison, ProductSeries, RevenueSummary,
};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `?as_of=YYYY-MM-DD` pins "now" for a report; defaults to today.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AsOf {
    pub as_of: Option<NaiveDate>,
}

impl AsOf {
    pub fn date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(today)
    }
}

pub async fn load_dashboard(pool: &Pool<Sqlite>, now: NaiveDate) -> Result<DashboardPayload> {
    let records = queries::fetch_records_for_year(pool, now.year()).await?;
    let result = aggregate_revenue(&records, now.year());
    Ok(DashboardPayload::build(&result, now))
}

/*==========Dashboard=========== */

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<DashboardPayload>> {
    Ok(Json(load_dashboard(&state.db, as_of.date()).await?))
}

/*==========Revenue & Collection=========== */

pub async fn get_revenue_summary(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<RevenueSummary>> {
    let year = as_of.date().year();
    let records = queries::fetch_records_for_year(&state.db, year).await?;
    Ok(Json(reports::revenue_summary(&aggregate_revenue(&records, year))))
}

pub async fn get_monthly_realization(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<Vec<MonthPoint>>> {
    let year = as_of.date().year();
    let records = queries::fetch_records_for_year(&state.db, year).await?;
    let result = aggregate_revenue(&records, year);
    Ok(Json(reports::monthly_series(&result.monthly_realizations())))
}

pub async fn get_monthly_receivables(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<Vec<MonthPoint>>> {
    let year = as_of.date().year();
    let records = queries::fetch_records_for_year(&state.db, year).await?;
    let result = aggregate_revenue(&records, year);
    Ok(Json(reports::monthly_series(&result.monthly_targets())))
}

pub async fn get_product_comparison(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<Vec<ProductComparison>>> {
    let year = as_of.date().year();
    let records = queries::fetch_records_for_years(&state.db, year - 1, year).await?;
    Ok(Json(reports::product_comparison(
        &aggregate_revenue(&records, year),
        &aggregate_revenue(&records, year - 1),
    )))
}

pub async fn get_collection_summary(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<CollectionSummary>> {
    let now = as_of.date();
    let records = queries::fetch_records_for_year(&state.db, now.year()).await?;
    Ok(Json(reports::collection_summary(&aggregate_revenue(&records, now.year()), now)))
}

/*==========Expenses=========== */

pub async fn get_expenses_summary(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<ExpensesSummary>> {
    let now = as_of.date();
    let records = queries::fetch_records_for_year(&state.db, now.year()).await?;
    Ok(Json(reports::expenses_summary(&aggregate_expenses(&records, now.year()), now)))
}

pub async fn get_monthly_expenses_comparison(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<Vec<MonthComparison>>> {
    let year = as_of.date().year();
    let records = queries::fetch_records_for_years(&state.db, year - 1, year).await?;
    Ok(Json(reports::monthly_comparison(
        &aggregate_expenses(&records, year),
        &aggregate_expenses(&records, year - 1),
    )))
}

/*==========Progress=========== */

/// Every product found in this year's data.
pub async fn get_progress_summary(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<Progress>> {
    let now = as_of.date();
    let records = queries::fetch_records_for_year(&state.db, now.year()).await?;
    Ok(Json(progress(&aggregate_revenue(&records, now.year()), now)))
}

/// Only products registered as REVENUE budget codes.
pub async fn get_yearly_progress(
    State(state): State<AppState>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<Progress>> {
    let now = as_of.date();
    let registry = queries::revenue_product_names(&state.db).await?;
    let records = queries::fetch_records_for_year(&state.db, now.year()).await?;
    Ok(Json(reports::registry_progress(&records, now.year(), now, &registry)))
}

/*==========Products=========== */

pub async fn get_product(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(as_of): Query<AsOf>,
) -> Result<Json<ProductSeries>> {
    let year = as_of.date().year();
    let records = queries::fetch_records_for_years(&state.db, year - 1, year).await?;
    Ok(Json(reports::product_series(
        &name,
        &aggregate_revenue(&records, year),
        &aggregate_revenue(&records, year - 1),
    )))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductMonthValues {
    pub year: Option<i32>,
    pub target: Vec<Decimal>,
    pub realization: Vec<Decimal>,
}

pub async fn put_product(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(as_of): Query<AsOf>,
    Json(values): Json<ProductMonthValues>,
) -> Result<Json<Value>> {
    let year = values.year.unwrap_or_else(|| as_of.date().year());
    queries::replace_product_month_values(&state.db, &name, year, &values.target, &values.realization).await?;

    state.notifier.spawn_publish(state.db.clone());
    Ok(Json(json!({ "message": format!("{name} values for {year} saved") })))
}
