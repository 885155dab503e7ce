use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// What an amount-bearing row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Planned amount for a month/product.
    Target,
    /// Actual revenue or payment.
    Realization,
    /// Actual spending, not tied to a product.
    Expense,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Target => "Target",
            Self::Realization => "Realization",
            Self::Expense => "Expense",
        }
    }

    /// Realization and expense rows both count as "actual" amounts.
    pub fn is_actual(&self) -> bool {
        !matches!(self, Self::Target)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Target" => Ok(Self::Target),
            "Realization" => Ok(Self::Realization),
            "Expense" => Ok(Self::Expense),
            other => Err(DashboardError::InvalidRecordKind(other.to_string())),
        }
    }
}

/// One dated, typed amount. Read-only input to [`aggregate`](super::aggregate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub kind: RecordKind,
    pub product: Option<String>,
    pub budget_code_id: Option<i64>,
}

impl Record {
    pub fn new(date: NaiveDate, amount: Decimal, kind: RecordKind, product: Option<&str>) -> Self {
        Self {
            date,
            amount,
            kind,
            product: product.map(str::to_string),
            budget_code_id: None,
        }
    }

    /// Zero-based month slot, 0..=11.
    pub fn month_index(&self) -> usize {
        self.date.month0() as usize
    }
}

/// Reusable predicate for the common report scopes.
///
/// Every field left as `None` matches everything.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub kinds: Option<Vec<RecordKind>>,
    pub products: Option<Vec<String>>,
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl RecordFilter {
    pub fn kinds<I: IntoIterator<Item = RecordKind>>(kinds: I) -> Self {
        Self {
            kinds: Some(kinds.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Target and realization rows, with or without a product label.
    pub fn revenue() -> Self {
        Self::kinds([RecordKind::Target, RecordKind::Realization])
    }

    pub fn with_products<I, S>(mut self, products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.products = Some(products.into_iter().map(Into::into).collect());
        self
    }

    /// Inclusive date window.
    pub fn between(mut self, from: NaiveDate, until: NaiveDate) -> Self {
        self.from = Some(from);
        self.until = Some(until);
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        if let Some(kinds) = &self.kinds {
            if !kinds.contains(&record.kind) {
                return false;
            }
        }
        if let Some(products) = &self.products {
            match &record.product {
                Some(name) if products.iter().any(|p| p == name) => {}
                _ => return false,
            }
        }
        if self.from.is_some_and(|from| record.date < from) {
            return false;
        }
        if self.until.is_some_and(|until| record.date > until) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn kind_labels_parse_and_reject_unknown() {
        assert_eq!("Target".parse::<RecordKind>().unwrap(), RecordKind::Target);
        assert_eq!(" Expense ".parse::<RecordKind>().unwrap(), RecordKind::Expense);

        let err = "Realisasi".parse::<RecordKind>().unwrap_err();
        assert!(matches!(err, DashboardError::InvalidRecordKind(ref k) if k == "Realisasi"));
    }

    #[test]
    fn revenue_filter_skips_expenses_but_keeps_unlabelled_rows() {
        let filter = RecordFilter::revenue();
        let sale = Record::new(day(2024, 3, 1), dec!(10), RecordKind::Realization, Some("X"));
        let expense = Record::new(day(2024, 3, 1), dec!(10), RecordKind::Expense, Some("X"));
        let orphan = Record::new(day(2024, 3, 1), dec!(10), RecordKind::Target, None);

        assert!(filter.matches(&sale));
        assert!(!filter.matches(&expense));
        assert!(filter.matches(&orphan));
        assert!(!filter.clone().with_products(["X"]).matches(&orphan));
    }

    #[test]
    fn product_and_date_window_compose() {
        let filter = RecordFilter::default()
            .with_products(["Project Financing"])
            .between(day(2024, 2, 1), day(2024, 2, 29));

        let inside = Record::new(day(2024, 2, 29), dec!(1), RecordKind::Target, Some("Project Financing"));
        let other_product = Record::new(day(2024, 2, 10), dec!(1), RecordKind::Target, Some("Super"));
        let too_late = Record::new(day(2024, 3, 1), dec!(1), RecordKind::Target, Some("Project Financing"));

        assert!(filter.matches(&inside));
        assert!(!filter.matches(&other_product));
        assert!(!filter.matches(&too_late));
    }
}
