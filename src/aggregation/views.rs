use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fold::{AggregationResult, MonthlyBucket, MONTHS_PER_YEAR};
use super::ratio::achievement_percentage;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub target: Decimal,
    pub realization: Decimal,
}

impl PeriodTotals {
    pub fn achievement(&self) -> Decimal {
        achievement_percentage(self.realization, self.target)
    }
}

fn month_slot(now: NaiveDate) -> usize {
    now.month0() as usize
}

pub fn current_month(result: &AggregationResult, now: NaiveDate) -> MonthlyBucket {
    result.months[month_slot(now)].clone()
}

/// The month before `now`. January yields an empty bucket: the lookup does
/// not reach back into December of the previous year.
pub fn previous_month(result: &AggregationResult, now: NaiveDate) -> MonthlyBucket {
    match month_slot(now).checked_sub(1) {
        Some(index) => result.months[index].clone(),
        None => MonthlyBucket::default(),
    }
}

/// Sums from January through `now`'s month, inclusive.
pub fn year_to_date(result: &AggregationResult, now: NaiveDate) -> PeriodTotals {
    sum_months(&result.months[..=month_slot(now)])
}

pub fn annual_totals(result: &AggregationResult) -> PeriodTotals {
    sum_months(&result.months)
}

fn sum_months(months: &[MonthlyBucket]) -> PeriodTotals {
    months.iter().fold(PeriodTotals::default(), |acc, m| PeriodTotals {
        target: acc.target.saturating_add(m.total_target),
        realization: acc.realization.saturating_add(m.total_realization),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAchievement {
    pub name: String,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullYearProjection {
    pub year: i32,
    /// Each product's achievement within the current month.
    pub product_achievements: Vec<ProductAchievement>,
    pub monthly_target: [Decimal; MONTHS_PER_YEAR],
    pub monthly_realization: [Decimal; MONTHS_PER_YEAR],
    /// Realization booked so far this year. Not extrapolated.
    pub projected_total_realization: Decimal,
    pub annual_target: Decimal,
    pub projected_achievement: Decimal,
}

pub fn full_year_projection(result: &AggregationResult, now: NaiveDate) -> FullYearProjection {
    let product_achievements = result
        .month_products(month_slot(now))
        .into_iter()
        .map(|p| ProductAchievement {
            percentage: achievement_percentage(p.realization, p.target),
            name: p.name,
        })
        .collect();

    let projected_total_realization = year_to_date(result, now).realization;
    let annual_target = annual_totals(result).target;

    FullYearProjection {
        year: result.year,
        product_achievements,
        monthly_target: result.monthly_targets(),
        monthly_realization: result.monthly_realizations(),
        projected_total_realization,
        annual_target,
        projected_achievement: achievement_percentage(projected_total_realization, annual_target),
    }
}

/// Full-year target against realization booked through `now`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub year: i32,
    pub total_target: Decimal,
    pub total_realization_ytd: Decimal,
    pub percentage: Decimal,
}

pub fn progress(result: &AggregationResult, now: NaiveDate) -> Progress {
    let total_target = annual_totals(result).target;
    let total_realization_ytd = year_to_date(result, now).realization;

    Progress {
        year: result.year,
        total_target,
        total_realization_ytd,
        percentage: achievement_percentage(total_realization_ytd, total_target),
    }
}
