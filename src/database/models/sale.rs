use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregation::{Record, RecordKind};

/// A row of the `sales` table: targets, realizations and expenses alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub sale_id: i64,
    pub entry_date: NaiveDate,
    pub amount: Decimal,
    pub kind: RecordKind,
    pub product: Option<String>,
    pub income_name: Option<String>,
    pub note: Option<String>,
    pub entered_by: Option<String>,
    pub budget_code_id: Option<i64>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl Sale {
    pub fn to_record(&self) -> Record {
        Record {
            date: self.entry_date,
            amount: self.amount,
            kind: self.kind,
            product: self.product.clone(),
            budget_code_id: self.budget_code_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub entry_date: NaiveDate,
    pub amount: Decimal,
    /// Kept as text so an unknown label reaches validation instead of failing JSON decoding.
    pub kind: String,
    pub product: Option<String>,
    pub income_name: Option<String>,
    pub note: Option<String>,
    pub entered_by: Option<String>,
    pub budget_code_id: Option<i64>,
}

/// Optional filters for listing realization/expense rows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleQuery {
    pub kind: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub budget_code_id: Option<i64>,
}
