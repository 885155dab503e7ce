use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::MONTH_LABELS;
use crate::aggregation::{
    percentage_of, remaining, round2, saturating_sum, AggregationResult, Record, RecordKind,
};
use crate::database::models::{Debt, Payment};

/// Turns debts into monthly `Target` installments and payments into
/// `Realization` records, labelled with the debtor's name, so debt reports
/// reuse the same fold as sales.
///
/// Each debt contributes `total / duration`, rounded to cents, for `duration`
/// consecutive months starting at its start date. The last installment takes
/// the rounding remainder so the schedule sums to the total exactly.
/// Payments for unknown debts keep no label.
pub fn debt_schedule_records(debts: &[Debt], payments: &[Payment]) -> Vec<Record> {
    let mut records = Vec::new();

    for debt in debts {
        let months = debt.target_duration_months;
        let Some(installment) = debt.total_amount.checked_div(Decimal::from(months)).map(round2) else {
            continue;
        };
        let Some(scheduled) = installment.checked_mul(Decimal::from(months - 1)) else {
            continue;
        };
        let last = debt.total_amount.saturating_sub(scheduled);

        for offset in 0..months {
            let amount = if offset + 1 == months { last } else { installment };
            if let Some(date) = debt.start_date.checked_add_months(Months::new(offset)) {
                records.push(Record::new(date, amount, RecordKind::Target, Some(&debt.kopeg_name)));
            }
        }
    }

    let names: HashMap<i64, &str> = debts.iter().map(|d| (d.debt_id, d.kopeg_name.as_str())).collect();
    records.extend(payments.iter().map(|p| {
        Record::new(
            p.payment_date,
            p.amount,
            RecordKind::Realization,
            names.get(&p.debt_id).copied(),
        )
    }));

    records
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyDebtRow {
    pub month: &'static str,
    pub target: Decimal,
    pub realization: Decimal,
}

pub fn monthly_debt_realization(result: &AggregationResult) -> Vec<MonthlyDebtRow> {
    result
        .months
        .iter()
        .zip(MONTH_LABELS)
        .map(|(bucket, month)| MonthlyDebtRow {
            month,
            target: bucket.total_target,
            realization: bucket.total_realization,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtSummary {
    pub total_debt: Decimal,
    pub paid_this_month: Decimal,
    pub remaining_debt: Decimal,
    pub remaining_debt_percentage: Decimal,
}

pub fn debt_summary(debts: &[Debt], payments: &[Payment], now: NaiveDate) -> DebtSummary {
    let total_debt = saturating_sum(debts.iter().map(|d| d.total_amount));
    let total_paid = saturating_sum(payments.iter().map(|p| p.amount));
    let paid_this_month = saturating_sum(
        payments
            .iter()
            .filter(|p| p.payment_date.year() == now.year() && p.payment_date.month() == now.month())
            .map(|p| p.amount),
    );
    let remaining_debt = remaining(total_debt, total_paid);

    DebtSummary {
        total_debt,
        paid_this_month,
        remaining_debt,
        remaining_debt_percentage: percentage_of(remaining_debt, total_debt),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveDebt {
    pub debt_id: i64,
    pub description: Option<String>,
    pub kopeg_name: String,
    pub remaining: Decimal,
}

/// Debts whose payments have not yet covered the total, by debtor name.
pub fn active_debts(debts: &[Debt], payments: &[Payment]) -> Vec<ActiveDebt> {
    let mut paid: HashMap<i64, Decimal> = HashMap::new();
    for p in payments {
        let total = paid.entry(p.debt_id).or_default();
        *total = total.saturating_add(p.amount);
    }

    let mut active: Vec<ActiveDebt> = debts
        .iter()
        .filter_map(|d| {
            let left = d
                .total_amount
                .saturating_sub(paid.get(&d.debt_id).copied().unwrap_or_default());
            (left > Decimal::ZERO).then(|| ActiveDebt {
                debt_id: d.debt_id,
                description: d.description.clone(),
                kopeg_name: d.kopeg_name.clone(),
                remaining: left,
            })
        })
        .collect();

    active.sort_by(|a, b| a.kopeg_name.cmp(&b.kopeg_name).then(a.debt_id.cmp(&b.debt_id)));
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::aggregate;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn debt(id: i64, kopeg: &str, total: Decimal, months: u32, start: NaiveDate) -> Debt {
        Debt {
            debt_id: id,
            kopeg_id: id,
            kopeg_name: kopeg.to_string(),
            description: Some(format!("loan {id}")),
            total_amount: total,
            target_duration_months: months,
            start_date: start,
            is_paid_off: false,
        }
    }

    fn payment(id: i64, debt_id: i64, amount: Decimal, date: NaiveDate) -> Payment {
        Payment { payment_id: id, debt_id, amount, payment_date: date }
    }

    #[test]
    fn installments_cross_the_year_boundary() {
        let debts = vec![debt(1, "Kopeg A", dec!(1200), 4, day(2024, 11, 5))];
        let records = debt_schedule_records(&debts, &[]);

        let dates: Vec<_> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(2024, 11, 5), day(2024, 12, 5), day(2025, 1, 5), day(2025, 2, 5)]);
        assert!(records.iter().all(|r| r.amount == dec!(300) && r.kind == RecordKind::Target));

        let this_year = aggregate(&records, 2024, |_| true);
        assert_eq!(this_year.months[10].total_target, dec!(300));
        assert_eq!(this_year.months[11].total_target, dec!(300));
        let next_year = aggregate(&records, 2025, |_| true);
        assert_eq!(next_year.months[1].total_target, dec!(300));
    }

    #[test]
    fn uneven_installments_sum_to_the_total() {
        let debts = vec![debt(1, "Kopeg A", dec!(1000), 3, day(2024, 1, 10))];
        let records = debt_schedule_records(&debts, &[]);

        let amounts: Vec<_> = records.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![dec!(333.33), dec!(333.33), dec!(333.34)]);

        let result = aggregate(&records, 2024, |_| true);
        assert_eq!(result.products[0].annual_target, dec!(1000));
    }

    #[test]
    fn month_end_start_clamps_to_shorter_months() {
        let debts = vec![debt(1, "Kopeg A", dec!(300), 3, day(2024, 1, 31))];
        let dates: Vec<_> = debt_schedule_records(&debts, &[]).iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(2024, 1, 31), day(2024, 2, 29), day(2024, 3, 31)]);
    }

    #[test]
    fn monthly_target_against_payments() {
        let debts = vec![
            debt(1, "Kopeg A", dec!(600), 3, day(2024, 1, 1)),
            debt(2, "Kopeg B", dec!(100), 1, day(2024, 2, 1)),
        ];
        let payments = vec![
            payment(1, 1, dec!(200), day(2024, 1, 20)),
            payment(2, 2, dec!(100), day(2024, 2, 3)),
        ];

        let result = aggregate(&debt_schedule_records(&debts, &payments), 2024, |_| true);
        let rows = monthly_debt_realization(&result);

        assert_eq!(rows[0], MonthlyDebtRow { month: "Jan", target: dec!(200), realization: dec!(200) });
        assert_eq!(rows[1], MonthlyDebtRow { month: "Feb", target: dec!(300), realization: dec!(100) });
        assert_eq!(rows[3].target, Decimal::ZERO);
        assert_eq!(result.month_products(1)[1].name, "Kopeg B");
    }

    #[test]
    fn summary_and_active_debts() {
        let debts = vec![
            debt(1, "Zeta", dec!(1000), 10, day(2024, 1, 1)),
            debt(2, "Alpha", dec!(500), 5, day(2024, 1, 1)),
            debt(3, "Beta", dec!(200), 2, day(2024, 1, 1)),
        ];
        let payments = vec![
            payment(1, 1, dec!(100), day(2024, 2, 10)),
            payment(2, 1, dec!(150), day(2024, 3, 10)),
            payment(3, 3, dec!(200), day(2023, 3, 10)),
        ];

        let summary = debt_summary(&debts, &payments, day(2024, 3, 31));
        assert_eq!(summary.total_debt, dec!(1700));
        assert_eq!(summary.paid_this_month, dec!(150));
        assert_eq!(summary.remaining_debt, dec!(1250));
        assert_eq!(summary.remaining_debt_percentage, dec!(73.53));

        let active = active_debts(&debts, &payments);
        let view: Vec<_> = active.iter().map(|d| (d.kopeg_name.as_str(), d.remaining)).collect();
        assert_eq!(view, vec![("Alpha", dec!(500)), ("Zeta", dec!(750))]);
    }

    #[test]
    fn no_debts_means_zero_percentage() {
        let summary = debt_summary(&[], &[], day(2024, 1, 1));
        assert_eq!(summary.remaining_debt_percentage, Decimal::ZERO);
    }
}
