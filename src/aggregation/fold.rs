use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ratio::saturating_sum;
use super::record::{Record, RecordFilter, RecordKind};

pub const MONTHS_PER_YEAR: usize = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAmounts {
    pub target: Decimal,
    pub realization: Decimal,
}

impl ProductAmounts {
    fn add(&mut self, kind: RecordKind, amount: Decimal) {
        if kind.is_actual() {
            self.realization = self.realization.saturating_add(amount);
        } else {
            self.target = self.target.saturating_add(amount);
        }
    }
}

/// Totals for one calendar month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub total_target: Decimal,
    pub total_realization: Decimal,
    pub per_product: BTreeMap<String, ProductAmounts>,
}

impl MonthlyBucket {
    fn add(&mut self, record: &Record) {
        if record.kind.is_actual() {
            self.total_realization = self.total_realization.saturating_add(record.amount);
        } else {
            self.total_target = self.total_target.saturating_add(record.amount);
        }
        if let Some(product) = &record.product {
            self.per_product
                .entry(product.clone())
                .or_default()
                .add(record.kind, record.amount);
        }
    }

    pub fn product(&self, name: &str) -> ProductAmounts {
        self.per_product.get(name).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub name: String,
    pub annual_target: Decimal,
}

/// A product's amounts in one month, zero-filled when it had no rows there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthProduct {
    pub name: String,
    pub target: Decimal,
    pub realization: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub year: i32,
    pub months: [MonthlyBucket; MONTHS_PER_YEAR],
    /// Distinct products in first-seen order.
    pub products: Vec<ProductSummary>,
}

impl AggregationResult {
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            months: std::array::from_fn(|_| MonthlyBucket::default()),
            products: Vec::new(),
        }
    }

    /// Every known product for month `index` (0-based), in product-list order.
    pub fn month_products(&self, index: usize) -> Vec<MonthProduct> {
        let bucket = &self.months[index.min(MONTHS_PER_YEAR - 1)];
        self.products
            .iter()
            .map(|p| {
                let amounts = bucket.product(&p.name);
                MonthProduct {
                    name: p.name.clone(),
                    target: amounts.target,
                    realization: amounts.realization,
                }
            })
            .collect()
    }

    pub fn monthly_targets(&self) -> [Decimal; MONTHS_PER_YEAR] {
        std::array::from_fn(|i| self.months[i].total_target)
    }

    pub fn monthly_realizations(&self) -> [Decimal; MONTHS_PER_YEAR] {
        std::array::from_fn(|i| self.months[i].total_realization)
    }

    pub fn product_names(&self) -> Vec<String> {
        self.products.iter().map(|p| p.name.clone()).collect()
    }
}

/// Fold `records` dated in `year` and accepted by `keep` into monthly buckets.
///
/// Summation is order independent and saturates at the `Decimal` bounds; only
/// the product list order follows the input (first-seen). Records without a
/// product count toward the monthly totals but not the per-product breakdown.
pub fn aggregate<F>(records: &[Record], year: i32, keep: F) -> AggregationResult
where
    F: Fn(&Record) -> bool,
{
    use chrono::Datelike;

    let mut result = AggregationResult::empty(year);
    let mut seen: HashSet<&str> = HashSet::new();

    for record in records.iter().filter(|r| r.date.year() == year && keep(r)) {
        result.months[record.month_index()].add(record);

        if let Some(name) = record.product.as_deref() {
            if seen.insert(name) {
                result.products.push(ProductSummary {
                    name: name.to_string(),
                    annual_target: Decimal::ZERO,
                });
            }
        }
    }

    for summary in &mut result.products {
        summary.annual_target =
            saturating_sum(result.months.iter().map(|m| m.product(&summary.name).target));
    }

    result
}

/// Dashboard scope: targets and realizations, labelled or not.
pub fn aggregate_revenue(records: &[Record], year: i32) -> AggregationResult {
    let filter = RecordFilter::revenue();
    aggregate(records, year, |r| filter.matches(r))
}

/// Expense rows only; amounts land in `total_realization`.
pub fn aggregate_expenses(records: &[Record], year: i32) -> AggregationResult {
    let filter = RecordFilter::kinds([RecordKind::Expense]);
    aggregate(records, year, |r| filter.matches(r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn rec(y: i32, m: u32, d: u32, amount: Decimal, kind: RecordKind, product: Option<&str>) -> Record {
        Record::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), amount, kind, product)
    }

    fn mixed_year() -> Vec<Record> {
        vec![
            rec(2024, 1, 15, dec!(1000), RecordKind::Target, Some("X")),
            rec(2024, 1, 20, dec!(800), RecordKind::Realization, Some("X")),
            rec(2024, 2, 1, dec!(300), RecordKind::Target, Some("Y")),
            rec(2024, 2, 3, dec!(120.50), RecordKind::Realization, Some("Y")),
            rec(2024, 2, 9, dec!(99.50), RecordKind::Realization, Some("X")),
            rec(2024, 7, 1, dec!(-40), RecordKind::Target, Some("Y")),
            rec(2024, 12, 31, dec!(5), RecordKind::Expense, None),
            rec(2023, 12, 31, dec!(777), RecordKind::Target, Some("X")),
        ]
    }

    #[test]
    fn single_product_january() {
        let records = vec![
            rec(2024, 1, 15, dec!(1000), RecordKind::Target, Some("X")),
            rec(2024, 1, 20, dec!(800), RecordKind::Realization, Some("X")),
        ];
        let result = aggregate_revenue(&records, 2024);

        let jan = &result.months[0];
        assert_eq!(jan.total_target, dec!(1000));
        assert_eq!(jan.total_realization, dec!(800));
        assert_eq!(
            jan.product("X"),
            ProductAmounts { target: dec!(1000), realization: dec!(800) }
        );
        assert_eq!(jan.per_product.len(), 1);
        assert_eq!(result.products, vec![ProductSummary { name: "X".into(), annual_target: dec!(1000) }]);
    }

    #[test]
    fn target_totals_are_conserved() {
        let records = mixed_year();
        let result = aggregate(&records, 2024, |_| true);

        let bucket_sum: Decimal = result.months.iter().map(|m| m.total_target).sum();
        let input_sum: Decimal = records
            .iter()
            .filter(|r| r.kind == RecordKind::Target && r.date.format("%Y").to_string() == "2024")
            .map(|r| r.amount)
            .sum();
        assert_eq!(bucket_sum, input_sum);
        assert_eq!(bucket_sum, dec!(1260));
    }

    #[test]
    fn reordering_input_keeps_every_total() {
        let records = mixed_year();
        let mut reversed = records.clone();
        reversed.reverse();

        let a = aggregate(&records, 2024, |_| true);
        let b = aggregate(&reversed, 2024, |_| true);

        assert_eq!(a.months, b.months);
        let mut a_products = a.products.clone();
        let mut b_products = b.products.clone();
        a_products.sort_by(|l, r| l.name.cmp(&r.name));
        b_products.sort_by(|l, r| l.name.cmp(&r.name));
        assert_eq!(a_products, b_products);
    }

    #[test]
    fn product_list_follows_first_seen_order() {
        let records = mixed_year();
        let result = aggregate(&records, 2024, |_| true);
        assert_eq!(result.product_names(), vec!["X".to_string(), "Y".to_string()]);

        let mut reversed = records.clone();
        reversed.reverse();
        let result = aggregate(&reversed, 2024, |_| true);
        assert_eq!(result.product_names(), vec!["Y".to_string(), "X".to_string()]);
    }

    #[test]
    fn negative_target_passes_through() {
        let records = vec![rec(2024, 3, 1, dec!(-500), RecordKind::Target, Some("X"))];
        let result = aggregate_revenue(&records, 2024);

        assert_eq!(result.months[2].total_target, dec!(-500));
        assert_eq!(result.products[0].annual_target, dec!(-500));
    }

    #[test]
    fn unlabelled_expense_counts_in_month_only() {
        let records = mixed_year();
        let result = aggregate_expenses(&records, 2024);

        assert_eq!(result.months[11].total_realization, dec!(5));
        assert!(result.months[11].per_product.is_empty());
        assert!(result.products.is_empty());
    }

    #[test]
    fn unlabelled_realization_counts_in_month_only() {
        let records = vec![
            rec(2024, 3, 1, dec!(1000), RecordKind::Target, Some("X")),
            rec(2024, 3, 10, dec!(700), RecordKind::Realization, None),
            rec(2024, 3, 12, dec!(200), RecordKind::Realization, Some("X")),
            rec(2024, 3, 15, dec!(50), RecordKind::Target, None),
        ];
        let result = aggregate_revenue(&records, 2024);

        let march = &result.months[2];
        assert_eq!(march.total_realization, dec!(900));
        assert_eq!(march.total_target, dec!(1050));
        assert_eq!(march.per_product.len(), 1);
        assert_eq!(march.product("X"), ProductAmounts { target: dec!(1000), realization: dec!(200) });
        assert_eq!(result.product_names(), vec!["X".to_string()]);
    }

    #[test]
    fn overflowing_totals_saturate() {
        let half = Decimal::MAX / dec!(2) + dec!(1);
        let records = vec![
            rec(2024, 5, 1, half, RecordKind::Target, Some("X")),
            rec(2024, 5, 2, half, RecordKind::Target, Some("X")),
            rec(2024, 6, 1, half, RecordKind::Target, Some("X")),
        ];
        let result = aggregate_revenue(&records, 2024);

        assert_eq!(result.months[4].total_target, Decimal::MAX);
        assert_eq!(result.months[4].product("X").target, Decimal::MAX);
        assert_eq!(result.products[0].annual_target, Decimal::MAX);
    }

    #[test]
    fn other_years_are_ignored() {
        let result = aggregate(&mixed_year(), 2023, |_| true);
        assert_eq!(result.months[11].total_target, dec!(777));
        assert_eq!(result.months[0], MonthlyBucket::default());
    }

    #[test]
    fn month_products_are_zero_filled() {
        let result = aggregate_revenue(&mixed_year(), 2024);
        let january = result.month_products(0);

        assert_eq!(january.len(), 2);
        assert_eq!(january[1].name, "Y");
        assert_eq!(january[1].target, Decimal::ZERO);
        assert_eq!(january[1].realization, Decimal::ZERO);
    }

    #[test]
    fn empty_input_is_a_valid_result() {
        let result = aggregate_revenue(&[], 2024);
        assert_eq!(result, AggregationResult::empty(2024));
    }
}
