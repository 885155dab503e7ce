pub mod budget_code;
pub mod budget_target;
pub mod debt;
pub mod km_metric;
pub mod sale;

pub use budget_code::{BudgetCode, BudgetCodeQuery, BudgetCodeType, NewBudgetCode};
pub use budget_target::{BudgetTarget, BudgetTargetQuery, NewBudgetTarget};
pub use debt::{Debt, Kopeg, NewDebt, NewPayment, Payment};
pub use km_metric::{KmMetric, KmMetricUpdate};
pub use sale::{NewSale, Sale, SaleQuery};
