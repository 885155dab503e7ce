use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One financial-ratio KPI row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KmMetric {
    pub metric_id: i64,
    pub category: String,
    pub name: String,
    pub target: Decimal,
    pub ytd: Decimal,
    pub achievement: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KmMetricUpdate {
    pub metric_id: i64,
    pub target: Decimal,
    pub ytd: Decimal,
    /// Derived from `ytd / target` when omitted.
    pub achievement: Option<Decimal>,
}
