use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BudgetCodeType {
    Revenue,
    Expense,
    Product,
}

impl BudgetCodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "REVENUE",
            Self::Expense => "EXPENSE",
            Self::Product => "PRODUCT",
        }
    }

    /// Only revenue and expense codes carry monthly budget targets.
    pub fn accepts_targets(&self) -> bool {
        matches!(self, Self::Revenue | Self::Expense)
    }
}

impl fmt::Display for BudgetCodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetCodeType {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REVENUE" => Ok(Self::Revenue),
            "EXPENSE" => Ok(Self::Expense),
            "PRODUCT" => Ok(Self::Product),
            _ => Err(DashboardError::BadRequest(format!("unknown budget code type {s:?}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCode {
    pub budget_code_id: i64,
    pub code: String,
    pub name: String,
    pub code_type: BudgetCodeType,
    pub category: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBudgetCode {
    pub code: String,
    pub name: String,
    pub code_type: BudgetCodeType,
    pub category: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetCodeQuery {
    pub code_type: Option<BudgetCodeType>,
    pub category: Option<String>,
}
