//! Period aggregation: folds dated target/realization rows into twelve
//! monthly buckets with a per-product breakdown, plus the ratios and
//! period views every report is built from.
//!
//! Everything here is pure. "Now" is always passed in.

mod fold;
mod ratio;
mod record;
mod views;

pub use fold::{
    aggregate, aggregate_expenses, aggregate_revenue, AggregationResult, MonthProduct,
    MonthlyBucket, ProductAmounts, ProductSummary, MONTHS_PER_YEAR,
};
pub use ratio::{
    achievement_percentage, percent_label, percentage_of, period_delta, remaining, round2,
    saturating_sum, PeriodDelta,
};
pub use record::{Record, RecordFilter, RecordKind};
pub use views::{
    annual_totals, current_month, full_year_projection, previous_month, progress, year_to_date,
    FullYearProjection, PeriodTotals, ProductAchievement, Progress,
};
