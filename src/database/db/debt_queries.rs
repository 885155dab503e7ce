use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite, SqliteConnection};

use crate::database::db::util::{check_amount, iso, parse_amount, parse_date};
use crate::database::models::{Debt, Kopeg, NewDebt, NewPayment, Payment};
use crate::error::{DashboardError, Result};

/*
Debtor (kopeg) registry, their debts and the payments made against them.
 */

const DEBT_SELECT: &str = r#"
    SELECT d.debt_id, d.kopeg_id, k.name AS kopeg_name, d.description, d.total_amount,
           d.target_duration_months, d.start_date, d.is_paid_off
    FROM debts d
    JOIN kopeg k ON k.kopeg_id = d.kopeg_id
"#;

fn debt_from_row(row: &SqliteRow) -> Result<Debt> {
    let total: String = row.try_get("total_amount")?;
    let start: String = row.try_get("start_date")?;
    let duration: i64 = row.try_get("target_duration_months")?;

    Ok(Debt {
        debt_id: row.try_get("debt_id")?,
        kopeg_id: row.try_get("kopeg_id")?,
        kopeg_name: row.try_get("kopeg_name")?,
        description: row.try_get("description")?,
        total_amount: parse_amount(&total)?,
        target_duration_months: duration.max(0) as u32,
        start_date: parse_date(&start)?,
        is_paid_off: row.try_get("is_paid_off")?,
    })
}

fn payment_from_row(row: &SqliteRow) -> Result<Payment> {
    let amount: String = row.try_get("amount")?;
    let date: String = row.try_get("payment_date")?;

    Ok(Payment {
        payment_id: row.try_get("payment_id")?,
        debt_id: row.try_get("debt_id")?,
        amount: parse_amount(&amount)?,
        payment_date: parse_date(&date)?,
    })
}

/*==========Kopeg Queries=========== */

pub async fn list_kopeg(pool: &Pool<Sqlite>) -> Result<Vec<Kopeg>> {
    let rows = sqlx::query("SELECT kopeg_id, name FROM kopeg ORDER BY name")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| -> Result<Kopeg> {
            Ok(Kopeg {
                kopeg_id: row.try_get("kopeg_id")?,
                name: row.try_get("name")?,
            })
        })
        .collect()
}

async fn find_or_create_kopeg(conn: &mut SqliteConnection, name: &str) -> Result<i64> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT kopeg_id FROM kopeg WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id: i64 = sqlx::query_scalar("INSERT INTO kopeg (name) VALUES (?) RETURNING kopeg_id")
        .bind(name)
        .fetch_one(conn)
        .await?;
    tracing::info!(kopeg = name, kopeg_id = id, "registered new kopeg");
    Ok(id)
}

/*==========Debt Queries=========== */

/// Registers a debt starting on `start_date`, creating the debtor on first use.
pub async fn create_debt(pool: &Pool<Sqlite>, debt: &NewDebt, start_date: NaiveDate) -> Result<Debt> {
    let name = debt.kopeg_name.trim();
    if name.is_empty() {
        return Err(DashboardError::BadRequest("kopeg name is required".to_string()));
    }
    if debt.duration_in_months == 0 {
        return Err(DashboardError::BadRequest("duration must be at least one month".to_string()));
    }
    if debt.total_amount <= Decimal::ZERO {
        return Err(DashboardError::BadRequest("total amount must be positive".to_string()));
    }
    check_amount(debt.total_amount)?;

    let mut tx = pool.begin().await?;
    let kopeg_id = find_or_create_kopeg(&mut tx, name).await?;

    let debt_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO debts (kopeg_id, description, total_amount, target_duration_months, start_date, is_paid_off)
        VALUES (?, ?, ?, ?, ?, FALSE)
        RETURNING debt_id
        "#,
    )
    .bind(kopeg_id)
    .bind(debt.description.as_deref())
    .bind(debt.total_amount.to_string())
    .bind(i64::from(debt.duration_in_months))
    .bind(iso(&start_date))
    .fetch_one(&mut *tx)
    .await?;

    let created = find_debt(&mut tx, debt_id).await?;
    tx.commit().await?;
    Ok(created)
}

pub async fn list_debts(pool: &Pool<Sqlite>) -> Result<Vec<Debt>> {
    let rows = sqlx::query(&format!("{DEBT_SELECT} ORDER BY d.start_date, d.debt_id"))
        .fetch_all(pool)
        .await?;

    rows.iter().map(debt_from_row).collect()
}

async fn find_debt(conn: &mut SqliteConnection, debt_id: i64) -> Result<Debt> {
    let row = sqlx::query(&format!("{DEBT_SELECT} WHERE d.debt_id = ?"))
        .bind(debt_id)
        .fetch_optional(conn)
        .await?
        .ok_or(DashboardError::NotFound("debt"))?;

    debt_from_row(&row)
}

/*==========Payment Queries=========== */

pub async fn list_payments(pool: &Pool<Sqlite>) -> Result<Vec<Payment>> {
    let rows = sqlx::query(
        "SELECT payment_id, debt_id, amount, payment_date FROM payments ORDER BY payment_date, payment_id",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(payment_from_row).collect()
}

/* Records a payment dated `paid_on`. Once the payments cover the total the
debt is flagged as paid off. */
pub async fn record_payment(pool: &Pool<Sqlite>, payment: &NewPayment, paid_on: NaiveDate) -> Result<Payment> {
    if payment.amount <= Decimal::ZERO {
        return Err(DashboardError::BadRequest("payment amount must be positive".to_string()));
    }
    check_amount(payment.amount)?;

    let mut tx = pool.begin().await?;
    let debt = find_debt(&mut tx, payment.debt_id).await?;

    let row = sqlx::query(
        r#"
        INSERT INTO payments (debt_id, amount, payment_date)
        VALUES (?, ?, ?)
        RETURNING payment_id, debt_id, amount, payment_date
        "#,
    )
    .bind(payment.debt_id)
    .bind(payment.amount.to_string())
    .bind(iso(&paid_on))
    .fetch_one(&mut *tx)
    .await?;
    let created = payment_from_row(&row)?;

    let paid_amounts: Vec<String> = sqlx::query_scalar("SELECT amount FROM payments WHERE debt_id = ?")
        .bind(payment.debt_id)
        .fetch_all(&mut *tx)
        .await?;
    let mut paid = Decimal::ZERO;
    for amount in &paid_amounts {
        paid = paid.saturating_add(parse_amount(amount)?);
    }

    if !debt.is_paid_off && paid >= debt.total_amount {
        sqlx::query("UPDATE debts SET is_paid_off = TRUE WHERE debt_id = ?")
            .bind(payment.debt_id)
            .execute(&mut *tx)
            .await?;
        tracing::info!(debt_id = payment.debt_id, %paid, "debt paid off");
    }

    tx.commit().await?;
    Ok(created)
}
