use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A debtor entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kopeg {
    pub kopeg_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub debt_id: i64,
    pub kopeg_id: i64,
    pub kopeg_name: String,
    pub description: Option<String>,
    pub total_amount: Decimal,
    pub target_duration_months: u32,
    pub start_date: NaiveDate,
    pub is_paid_off: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: i64,
    pub debt_id: i64,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDebt {
    pub kopeg_name: String,
    pub description: Option<String>,
    pub total_amount: Decimal,
    pub duration_in_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub debt_id: i64,
    pub amount: Decimal,
}
