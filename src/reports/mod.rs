//! Response shapes built from an [`AggregationResult`](crate::aggregation::AggregationResult).
//!
//! Nothing in here touches the database; handlers fetch records, fold them
//! and hand the result (plus "now") to one of these builders.

mod dashboard;
mod debt;
mod series;

pub use dashboard::{
    CurrentMonthPerformance, DashboardPayload, PieSeries, ProductMonthlyAchievement,
    ProductPerformanceRow, Statistics, TopComparison, YearlyProjection, YtdPerformance,
};
pub use debt::{
    active_debts, debt_schedule_records, debt_summary, monthly_debt_realization, ActiveDebt,
    DebtSummary, MonthlyDebtRow,
};
pub use series::{
    collection_summary, expenses_summary, monthly_comparison, monthly_series, product_comparison,
    product_series, registry_progress, revenue_summary, CollectionSummary, ExpensesSummary,
    MonthComparison, MonthPoint, ProductComparison, ProductSeries, RevenueSummary,
};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
