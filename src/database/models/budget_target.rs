use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetTarget {
    pub budget_target_id: i64,
    pub budget_code_id: i64,
    pub month: u32,
    pub year: i32,
    pub target_amount: Decimal,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBudgetTarget {
    pub budget_code_id: i64,
    pub month: u32,
    pub year: i32,
    pub target_amount: Decimal,
    pub entered_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetTargetQuery {
    pub budget_code_id: Option<i64>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}
