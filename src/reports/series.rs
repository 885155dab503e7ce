use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::MONTH_LABELS;
use crate::aggregation::{
    achievement_percentage, aggregate, annual_totals, current_month, progress, saturating_sum,
    year_to_date, AggregationResult, Progress, Record, RecordFilter, MONTHS_PER_YEAR,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthPoint {
    pub month: &'static str,
    pub amount: Decimal,
}

/// Labels twelve monthly values, January first.
pub fn monthly_series(values: &[Decimal; MONTHS_PER_YEAR]) -> Vec<MonthPoint> {
    MONTH_LABELS
        .iter()
        .zip(values)
        .map(|(month, amount)| MonthPoint { month: *month, amount: *amount })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueSummary {
    pub total_revenue: Decimal,
    pub total_target: Decimal,
    pub target_achievement: Decimal,
}

pub fn revenue_summary(result: &AggregationResult) -> RevenueSummary {
    let annual = annual_totals(result);
    RevenueSummary {
        total_revenue: annual.realization,
        total_target: annual.target,
        target_achievement: annual.achievement(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionSummary {
    pub total_collection_this_year: Decimal,
    pub receivables_this_month: Decimal,
    pub realization_this_month: Decimal,
    pub collection_rate: Decimal,
}

/// Collection rate compares this month's realization with this month's
/// receivables. No receivables gives a rate of zero.
pub fn collection_summary(result: &AggregationResult, now: NaiveDate) -> CollectionSummary {
    let month = current_month(result, now);
    CollectionSummary {
        total_collection_this_year: annual_totals(result).realization,
        receivables_this_month: month.total_target,
        realization_this_month: month.total_realization,
        collection_rate: achievement_percentage(month.total_realization, month.total_target),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpensesSummary {
    pub expenses_ytd: Decimal,
    pub expenses_current_month: Decimal,
}

/// `result` is an expense fold, so the amounts sit in the realization totals.
pub fn expenses_summary(result: &AggregationResult, now: NaiveDate) -> ExpensesSummary {
    ExpensesSummary {
        expenses_ytd: year_to_date(result, now).realization,
        expenses_current_month: current_month(result, now).total_realization,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductComparison {
    pub product_name: String,
    pub current_year_revenue: Decimal,
    pub previous_year_revenue: Decimal,
}

fn product_realization(result: &AggregationResult, name: &str) -> Decimal {
    saturating_sum(result.months.iter().map(|m| m.product(name).realization))
}

/// Annual realization per product across two folds. Products seen only in
/// the previous year are listed after the current year's.
pub fn product_comparison(current: &AggregationResult, previous: &AggregationResult) -> Vec<ProductComparison> {
    let mut names = current.product_names();
    for name in previous.product_names() {
        if !names.contains(&name) {
            names.push(name);
        }
    }

    names
        .into_iter()
        .map(|name| ProductComparison {
            current_year_revenue: product_realization(current, &name),
            previous_year_revenue: product_realization(previous, &name),
            product_name: name,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthComparison {
    pub month: &'static str,
    pub current_year: Decimal,
    pub previous_year: Decimal,
}

pub fn monthly_comparison(current: &AggregationResult, previous: &AggregationResult) -> Vec<MonthComparison> {
    let this_year = current.monthly_realizations();
    let last_year = previous.monthly_realizations();

    (0..MONTHS_PER_YEAR)
        .map(|i| MonthComparison {
            month: MONTH_LABELS[i],
            current_year: this_year[i],
            previous_year: last_year[i],
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSeries {
    pub product: String,
    pub year: i32,
    pub target: [Decimal; MONTHS_PER_YEAR],
    pub realization: [Decimal; MONTHS_PER_YEAR],
    pub realization_prev: [Decimal; MONTHS_PER_YEAR],
    pub total_target: Decimal,
    pub total_realization: Decimal,
    pub achievement: Decimal,
}

pub fn product_series(name: &str, current: &AggregationResult, previous: &AggregationResult) -> ProductSeries {
    let target: [Decimal; MONTHS_PER_YEAR] = std::array::from_fn(|i| current.months[i].product(name).target);
    let realization: [Decimal; MONTHS_PER_YEAR] =
        std::array::from_fn(|i| current.months[i].product(name).realization);
    let realization_prev = std::array::from_fn(|i| previous.months[i].product(name).realization);

    let total_target = saturating_sum(target);
    let total_realization = saturating_sum(realization);

    ProductSeries {
        product: name.to_string(),
        year: current.year,
        target,
        realization,
        realization_prev,
        total_target,
        total_realization,
        achievement: achievement_percentage(total_realization, total_target),
    }
}

/// Progress restricted to the registry's products. An empty registry
/// matches nothing.
pub fn registry_progress(records: &[Record], year: i32, now: NaiveDate, registry: &[String]) -> Progress {
    let filter = RecordFilter::revenue().with_products(registry.iter().cloned());
    progress(&aggregate(records, year, |r| filter.matches(r)), now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{aggregate_expenses, aggregate_revenue, RecordKind};
    use rust_decimal_macros::dec;

    fn rec(y: i32, m: u32, amount: Decimal, kind: RecordKind, product: Option<&str>) -> Record {
        Record::new(NaiveDate::from_ymd_opt(y, m, 10).unwrap(), amount, kind, product)
    }

    fn now() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn records() -> Vec<Record> {
        vec![
            rec(2023, 3, dec!(300), RecordKind::Realization, Some("Legacy")),
            rec(2023, 5, dec!(700), RecordKind::Realization, Some("Super")),
            rec(2023, 3, dec!(40), RecordKind::Expense, None),
            rec(2024, 3, dec!(1000), RecordKind::Target, Some("Super")),
            rec(2024, 3, dec!(900), RecordKind::Realization, Some("Super")),
            rec(2024, 4, dec!(500), RecordKind::Target, Some("Financing")),
            rec(2024, 1, dec!(25), RecordKind::Expense, None),
            rec(2024, 3, dec!(60), RecordKind::Expense, None),
            rec(2024, 9, dec!(15), RecordKind::Expense, None),
        ]
    }

    #[test]
    fn series_are_labelled_january_first() {
        let result = aggregate_revenue(&records(), 2024);
        let series = monthly_series(&result.monthly_targets());

        assert_eq!(series.len(), 12);
        assert_eq!(series[0], MonthPoint { month: "Jan", amount: Decimal::ZERO });
        assert_eq!(series[2], MonthPoint { month: "Mar", amount: dec!(1000) });
        assert_eq!(series[3].amount, dec!(500));
    }

    #[test]
    fn revenue_and_collection_summaries() {
        let result = aggregate_revenue(&records(), 2024);

        let revenue = revenue_summary(&result);
        assert_eq!(revenue.total_target, dec!(1500));
        assert_eq!(revenue.total_revenue, dec!(900));
        assert_eq!(revenue.target_achievement, dec!(60.00));

        let collection = collection_summary(&result, now());
        assert_eq!(collection.receivables_this_month, dec!(1000));
        assert_eq!(collection.collection_rate, dec!(90.00));
    }

    #[test]
    fn collection_rate_is_zero_without_receivables() {
        let records = vec![rec(2024, 3, dec!(50), RecordKind::Realization, Some("Super"))];
        let collection = collection_summary(&aggregate_revenue(&records, 2024), now());
        assert_eq!(collection.realization_this_month, dec!(50));
        assert_eq!(collection.collection_rate, Decimal::ZERO);
    }

    #[test]
    fn expenses_by_period_and_year() {
        let this_year = aggregate_expenses(&records(), 2024);
        let last_year = aggregate_expenses(&records(), 2023);

        let summary = expenses_summary(&this_year, now());
        assert_eq!(summary.expenses_ytd, dec!(85));
        assert_eq!(summary.expenses_current_month, dec!(60));

        let months = monthly_comparison(&this_year, &last_year);
        assert_eq!(months[2], MonthComparison { month: "Mar", current_year: dec!(60), previous_year: dec!(40) });
        assert_eq!(months[8].current_year, dec!(15));
    }

    #[test]
    fn products_are_discovered_from_both_years() {
        let this_year = aggregate_revenue(&records(), 2024);
        let last_year = aggregate_revenue(&records(), 2023);

        let rows = product_comparison(&this_year, &last_year);
        let names: Vec<_> = rows.iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(names, vec!["Super", "Financing", "Legacy"]);
        assert_eq!(rows[0].current_year_revenue, dec!(900));
        assert_eq!(rows[0].previous_year_revenue, dec!(700));
        assert_eq!(rows[2].current_year_revenue, Decimal::ZERO);
    }

    #[test]
    fn product_series_carries_previous_year() {
        let this_year = aggregate_revenue(&records(), 2024);
        let last_year = aggregate_revenue(&records(), 2023);

        let series = product_series("Super", &this_year, &last_year);
        assert_eq!(series.target[2], dec!(1000));
        assert_eq!(series.realization[2], dec!(900));
        assert_eq!(series.realization_prev[4], dec!(700));
        assert_eq!(series.achievement, dec!(90.00));

        let unknown = product_series("Nope", &this_year, &last_year);
        assert_eq!(unknown.total_target, Decimal::ZERO);
        assert_eq!(unknown.achievement, Decimal::ZERO);
    }

    #[test]
    fn registry_limits_progress() {
        let registry = vec!["Financing".to_string()];
        let p = registry_progress(&records(), 2024, now(), &registry);
        assert_eq!(p.total_target, dec!(500));
        assert_eq!(p.total_realization_ytd, Decimal::ZERO);

        let none = registry_progress(&records(), 2024, now(), &[]);
        assert_eq!(none.total_target, Decimal::ZERO);
    }
}
