//! Text <-> value helpers for columns SQLite stores as TEXT.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::error::{DashboardError, Result};

/// Largest magnitude accepted for a single stored amount.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000_000;

/// Rejects amounts outside `±MAX_AMOUNT` before they are written.
pub fn check_amount(amount: Decimal) -> Result<Decimal> {
    if amount.abs() > Decimal::from(MAX_AMOUNT) {
        return Err(DashboardError::InvalidAmount(amount.to_string()));
    }
    Ok(amount)
}

pub fn parse_amount(s: &str) -> Result<Decimal> {
    Decimal::from_str(s.trim()).map_err(|_| DashboardError::InvalidAmount(s.to_string()))
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    // Some rows carry a time suffix ("2024-01-15 00:00:00"); only the date matters.
    let day = s.trim().get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(day, "%Y/%m/%d"))
        .map_err(|_| DashboardError::InvalidDate(s.to_string()))
}

pub fn iso(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub fn month_start(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| DashboardError::BadRequest(format!("invalid month {year}-{month}")))
}

/// First day of the month after `d`'s month.
pub fn next_month_start(d: NaiveDate) -> Result<NaiveDate> {
    if d.month() == 12 {
        month_start(d.year() + 1, 1)
    } else {
        month_start(d.year(), d.month() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amounts_parse_exactly() {
        assert_eq!(parse_amount("1500000.25").unwrap(), dec!(1500000.25));
        assert_eq!(parse_amount(" -500 ").unwrap(), dec!(-500));
        assert!(matches!(parse_amount("12,5"), Err(DashboardError::InvalidAmount(_))));
    }

    #[test]
    fn amounts_beyond_the_bound_are_rejected() {
        let max = Decimal::from(MAX_AMOUNT);
        assert_eq!(check_amount(max).unwrap(), max);
        assert_eq!(check_amount(-max).unwrap(), -max);
        assert!(matches!(check_amount(max + dec!(0.01)), Err(DashboardError::InvalidAmount(_))));
        assert!(matches!(check_amount(Decimal::MIN), Err(DashboardError::InvalidAmount(_))));
    }

    #[test]
    fn dates_accept_time_suffix_and_slashes() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("2024-01-15").unwrap(), expected);
        assert_eq!(parse_date("2024-01-15 08:30:00").unwrap(), expected);
        assert_eq!(parse_date("2024/01/15").unwrap(), expected);
        assert!(matches!(parse_date("15-01-2024"), Err(DashboardError::InvalidDate(_))));
    }

    #[test]
    fn month_rollover() {
        let dec31 = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(next_month_start(dec31).unwrap(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert!(month_start(2024, 13).is_err());
    }
}
