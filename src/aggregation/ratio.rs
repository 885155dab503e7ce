use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round to two places, halves away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `part / whole * 100`, rounded to two places. A zero `whole` (or an
/// overflowing quotient) yields zero.
pub fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|q| q.checked_mul(HUNDRED))
        .map(round2)
        .unwrap_or(Decimal::ZERO)
}

/// Realization as a percentage of target; zero target means 0%.
pub fn achievement_percentage(realization: Decimal, target: Decimal) -> Decimal {
    percentage_of(realization, target)
}

/// Adds amounts, clamping at `Decimal::MAX`/`MIN` instead of overflowing.
pub fn saturating_sum<I: IntoIterator<Item = Decimal>>(amounts: I) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// What is left to reach `target`, never negative.
pub fn remaining(target: Decimal, realization: Decimal) -> Decimal {
    target.saturating_sub(realization).max(Decimal::ZERO)
}

/// `"80.00%"`-style label used by the tables.
pub fn percent_label(value: Decimal) -> String {
    format!("{:.2}%", round2(value))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDelta {
    pub previous: Decimal,
    pub current: Decimal,
    pub difference: Decimal,
    /// Change relative to `previous`; zero when `previous` is zero.
    pub percentage: Decimal,
    pub percentage_label: String,
    pub is_increasing: bool,
}

pub fn period_delta(current: Decimal, previous: Decimal) -> PeriodDelta {
    let difference = current.saturating_sub(previous);
    let (percentage, percentage_label) = if previous.is_zero() {
        (Decimal::ZERO, "0%".to_string())
    } else {
        let pct = percentage_of(difference, previous);
        (pct, percent_label(pct))
    };

    PeriodDelta {
        previous,
        current,
        difference,
        percentage,
        percentage_label,
        is_increasing: current >= previous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn achievement_of_zero_target_is_zero() {
        for realization in [dec!(0), dec!(1), dec!(-250), dec!(99999999.99)] {
            assert_eq!(achievement_percentage(realization, Decimal::ZERO), Decimal::ZERO);
        }
    }

    #[test]
    fn achievement_rounds_to_two_places() {
        assert_eq!(achievement_percentage(dec!(800), dec!(1000)), dec!(80.00));
        assert_eq!(achievement_percentage(dec!(1), dec!(3)), dec!(33.33));
        assert_eq!(achievement_percentage(dec!(2), dec!(3)), dec!(66.67));
        assert_eq!(achievement_percentage(dec!(1), dec!(800)), dec!(0.13));
    }

    #[test]
    fn overflowing_ratio_falls_back_to_zero() {
        assert_eq!(percentage_of(Decimal::MAX, dec!(0.0000001)), Decimal::ZERO);
    }

    #[test]
    fn remaining_never_goes_negative() {
        assert_eq!(remaining(dec!(500), dec!(0)), dec!(500));
        assert_eq!(remaining(dec!(500), dec!(499.99)), dec!(0.01));
        assert_eq!(remaining(dec!(500), dec!(750)), Decimal::ZERO);
        assert_eq!(remaining(dec!(-10), dec!(0)), Decimal::ZERO);
    }

    #[test]
    fn sums_and_differences_saturate() {
        assert_eq!(saturating_sum([Decimal::MAX, dec!(1), dec!(1)]), Decimal::MAX);
        assert_eq!(saturating_sum([Decimal::MIN, dec!(-1)]), Decimal::MIN);
        assert_eq!(saturating_sum([dec!(1.25), dec!(2.75)]), dec!(4));
        assert_eq!(remaining(Decimal::MAX, Decimal::MIN), Decimal::MAX);
        assert_eq!(period_delta(Decimal::MIN, Decimal::MAX).difference, Decimal::MIN);
    }

    #[test]
    fn delta_against_empty_previous_reads_zero_percent() {
        let delta = period_delta(dec!(1200), Decimal::ZERO);
        assert_eq!(delta.difference, dec!(1200));
        assert_eq!(delta.percentage, Decimal::ZERO);
        assert_eq!(delta.percentage_label, "0%");
        assert!(delta.is_increasing);

        let delta = period_delta(dec!(-1200), Decimal::ZERO);
        assert_eq!(delta.percentage_label, "0%");
        assert!(!delta.is_increasing);
    }

    #[test]
    fn delta_reports_signed_change() {
        let delta = period_delta(dec!(750), dec!(1000));
        assert_eq!(delta.difference, dec!(-250));
        assert_eq!(delta.percentage, dec!(-25.00));
        assert_eq!(delta.percentage_label, "-25.00%");
        assert!(!delta.is_increasing);
    }
}
