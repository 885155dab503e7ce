pub mod connection;
pub mod debt_queries;
pub mod metric_queries;
pub mod migrate;
pub mod queries;
pub mod util;
