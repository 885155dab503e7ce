use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::MONTH_LABELS;
use crate::aggregation::{
    achievement_percentage, current_month, full_year_projection, percent_label, period_delta,
    previous_month, remaining, year_to_date, AggregationResult, FullYearProjection, MonthProduct,
    PeriodDelta, ProductSummary, MONTHS_PER_YEAR,
};

/// A realized-vs-remaining pie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSeries {
    pub labels: [&'static str; 2],
    pub series: [Decimal; 2],
}

impl PieSeries {
    fn of(target: Decimal, realization: Decimal) -> Self {
        Self {
            labels: ["Realization", "Remaining Target"],
            series: [realization, remaining(target, realization)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopComparison {
    #[serde(flatten)]
    pub realization: PeriodDelta,
    pub nominal_monthly_target: Decimal,
    pub nominal_monthly_realization: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductMonthlyAchievement {
    pub name: String,
    pub target: Decimal,
    pub realization: Decimal,
    pub percentage: Decimal,
    pub achievement_label: String,
    pub is_achieved: bool,
    pub pie: PieSeries,
}

impl From<MonthProduct> for ProductMonthlyAchievement {
    fn from(p: MonthProduct) -> Self {
        let percentage = achievement_percentage(p.realization, p.target);
        Self {
            pie: PieSeries::of(p.target, p.realization),
            is_achieved: p.realization >= p.target,
            achievement_label: percent_label(percentage),
            percentage,
            target: p.target,
            realization: p.realization,
            name: p.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentMonthPerformance {
    pub month: &'static str,
    pub total_target: Decimal,
    pub total_realization: Decimal,
    pub pie: PieSeries,
    pub percentage: Decimal,
    pub product_achievements: Vec<ProductMonthlyAchievement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YtdPerformance {
    pub total_target: Decimal,
    pub total_realization: Decimal,
    pub pie: PieSeries,
    pub percentage: Decimal,
    /// Each product's full-year target.
    pub product_distribution: Vec<ProductSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyProjection {
    #[serde(flatten)]
    pub projection: FullYearProjection,
    pub month_labels: [&'static str; MONTHS_PER_YEAR],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPerformanceRow {
    pub name: String,
    pub target: Decimal,
    pub realization: Decimal,
    pub achievement_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub product_performance: Vec<ProductPerformanceRow>,
    pub month_labels: [&'static str; MONTHS_PER_YEAR],
    pub monthly_target: [Decimal; MONTHS_PER_YEAR],
    pub monthly_realization: [Decimal; MONTHS_PER_YEAR],
}

/// Everything the main dashboard page renders, computed from one fold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPayload {
    pub year: i32,
    pub as_of: NaiveDate,
    pub top_comparison: TopComparison,
    pub current_month_performance: CurrentMonthPerformance,
    pub ytd_performance: YtdPerformance,
    pub yearly_projection: YearlyProjection,
    pub statistics: Statistics,
}

impl DashboardPayload {
    pub fn build(result: &AggregationResult, now: NaiveDate) -> Self {
        let month0 = now.month0() as usize;
        let current = current_month(result, now);
        let previous = previous_month(result, now);
        let month_products = result.month_products(month0);

        let top_comparison = TopComparison {
            realization: period_delta(current.total_realization, previous.total_realization),
            nominal_monthly_target: current.total_target,
            nominal_monthly_realization: current.total_realization,
        };

        let current_month_performance = CurrentMonthPerformance {
            month: MONTH_LABELS[month0],
            total_target: current.total_target,
            total_realization: current.total_realization,
            pie: PieSeries::of(current.total_target, current.total_realization),
            percentage: achievement_percentage(current.total_realization, current.total_target),
            product_achievements: month_products.iter().cloned().map(Into::into).collect(),
        };

        let ytd = year_to_date(result, now);
        let ytd_performance = YtdPerformance {
            total_target: ytd.target,
            total_realization: ytd.realization,
            pie: PieSeries::of(ytd.target, ytd.realization),
            percentage: ytd.achievement(),
            product_distribution: result.products.clone(),
        };

        let statistics = Statistics {
            product_performance: month_products
                .into_iter()
                .map(|p| ProductPerformanceRow {
                    achievement_label: percent_label(achievement_percentage(p.realization, p.target)),
                    name: p.name,
                    target: p.target,
                    realization: p.realization,
                })
                .collect(),
            month_labels: MONTH_LABELS,
            monthly_target: result.monthly_targets(),
            monthly_realization: result.monthly_realizations(),
        };

        Self {
            year: result.year,
            as_of: now,
            top_comparison,
            current_month_performance,
            ytd_performance,
            yearly_projection: YearlyProjection {
                projection: full_year_projection(result, now),
                month_labels: MONTH_LABELS,
            },
            statistics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{aggregate_revenue, Record, RecordKind};
    use rust_decimal_macros::dec;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn records() -> Vec<Record> {
        vec![
            Record::new(day(1, 1), dec!(1000), RecordKind::Target, Some("X")),
            Record::new(day(1, 20), dec!(800), RecordKind::Realization, Some("X")),
            Record::new(day(2, 1), dec!(1000), RecordKind::Target, Some("X")),
            Record::new(day(2, 1), dec!(500), RecordKind::Target, Some("Y")),
            Record::new(day(2, 11), dec!(1100), RecordKind::Realization, Some("X")),
            Record::new(day(2, 12), dec!(100), RecordKind::Realization, Some("Y")),
            Record::new(day(6, 1), dec!(2000), RecordKind::Target, Some("X")),
        ]
    }

    #[test]
    fn february_dashboard() {
        let result = aggregate_revenue(&records(), 2024);
        let payload = DashboardPayload::build(&result, day(2, 15));

        let top = &payload.top_comparison;
        assert_eq!(top.realization.previous, dec!(800));
        assert_eq!(top.realization.current, dec!(1200));
        assert_eq!(top.realization.percentage_label, "50.00%");
        assert!(top.realization.is_increasing);
        assert_eq!(top.nominal_monthly_target, dec!(1500));

        let month = &payload.current_month_performance;
        assert_eq!(month.month, "Feb");
        assert_eq!(month.pie.series, [dec!(1200), dec!(300)]);
        assert_eq!(month.percentage, dec!(80.00));

        let x = &month.product_achievements[0];
        assert_eq!((x.name.as_str(), x.percentage, x.is_achieved), ("X", dec!(110.00), true));
        assert_eq!(x.pie.series, [dec!(1100), Decimal::ZERO]);
        let y = &month.product_achievements[1];
        assert_eq!((y.achievement_label.as_str(), y.is_achieved), ("20.00%", false));

        assert_eq!(payload.ytd_performance.total_target, dec!(2500));
        assert_eq!(payload.ytd_performance.total_realization, dec!(2000));
        assert_eq!(payload.ytd_performance.product_distribution[0].annual_target, dec!(4000));

        assert_eq!(payload.yearly_projection.projection.projected_total_realization, dec!(2000));
        assert_eq!(payload.statistics.monthly_target[5], dec!(2000));
        assert_eq!(payload.statistics.product_performance[1].achievement_label, "20.00%");
    }

    #[test]
    fn january_compares_against_zero() {
        let result = aggregate_revenue(&records(), 2024);
        let payload = DashboardPayload::build(&result, day(1, 31));

        assert_eq!(payload.top_comparison.realization.previous, Decimal::ZERO);
        assert_eq!(payload.top_comparison.realization.percentage_label, "0%");
    }

    #[test]
    fn empty_year_serializes_with_zeros() {
        let result = aggregate_revenue(&[], 2025);
        let payload = DashboardPayload::build(&result, NaiveDate::from_ymd_opt(2025, 7, 4).unwrap());

        assert!(payload.current_month_performance.product_achievements.is_empty());
        assert_eq!(payload.ytd_performance.percentage, Decimal::ZERO);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["current_month_performance"]["month"], "Jul");
        assert_eq!(json["top_comparison"]["percentage_label"], "0%");
        assert_eq!(json["yearly_projection"]["month_labels"][11], "Dec");
    }
}
