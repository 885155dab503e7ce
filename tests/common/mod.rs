#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Pool, Sqlite};

use finance_dashboard::database::db::connection::memory_pool;
use finance_dashboard::database::db::migrate::run_migrations;
use finance_dashboard::database::db::queries;
use finance_dashboard::database::models::{NewSale, Sale};

pub async fn test_pool() -> Pool<Sqlite> {
    let pool = memory_pool().await.expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn new_sale(date: NaiveDate, amount: Decimal, kind: &str, product: Option<&str>) -> NewSale {
    NewSale {
        entry_date: date,
        amount,
        kind: kind.to_string(),
        product: product.map(str::to_string),
        income_name: None,
        note: None,
        entered_by: Some("tester".to_string()),
        budget_code_id: None,
    }
}

pub async fn insert(pool: &Pool<Sqlite>, date: NaiveDate, amount: Decimal, kind: &str, product: Option<&str>) -> Sale {
    queries::create_sale(pool, &new_sale(date, amount, kind, product))
        .await
        .expect("insert sale")
}

/// Seeds a KM metric row with zeroed values; the API only updates metrics.
pub async fn insert_metric(pool: &Pool<Sqlite>, category: &str, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO km_metrics (category, name) VALUES (?, ?) RETURNING metric_id")
        .bind(category)
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("insert metric")
}
