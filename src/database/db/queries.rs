use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, QueryBuilder, Row, Sqlite, SqliteConnection};

use crate::aggregation::{Record, RecordKind, MONTHS_PER_YEAR};
use crate::database::db::util::{check_amount, iso, month_start, next_month_start, parse_amount, parse_date};
use crate::database::models::{
    BudgetCode, BudgetCodeQuery, BudgetCodeType, BudgetTarget, BudgetTargetQuery, NewBudgetCode,
    NewBudgetTarget, NewSale, Sale, SaleQuery,
};
use crate::error::{DashboardError, Result};

/*
Record source for the reports plus the budget master data.
Amounts are TEXT columns; every row is decoded (and rejected if malformed)
here, before anything reaches the aggregator.
 */

const SALE_COLUMNS: &str = "sale_id, entry_date, amount, kind, product, income_name, note, \
                            entered_by, budget_code_id, created_at, updated_at";

const BUDGET_CODE_COLUMNS: &str =
    "budget_code_id, code, name, code_type, category, description, created_at, updated_at";

const BUDGET_TARGET_COLUMNS: &str =
    "budget_target_id, budget_code_id, month, year, target_amount, created_at, updated_at";

fn sale_from_row(row: &SqliteRow) -> Result<Sale> {
    let entry_date: String = row.try_get("entry_date")?;
    let amount: String = row.try_get("amount")?;
    let kind: String = row.try_get("kind")?;

    Ok(Sale {
        sale_id: row.try_get("sale_id")?,
        entry_date: parse_date(&entry_date)?,
        amount: parse_amount(&amount)?,
        kind: kind.parse()?,
        product: row.try_get("product")?,
        income_name: row.try_get("income_name")?,
        note: row.try_get("note")?,
        entered_by: row.try_get("entered_by")?,
        budget_code_id: row.try_get("budget_code_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn budget_code_from_row(row: &SqliteRow) -> Result<BudgetCode> {
    let code_type: String = row.try_get("code_type")?;

    Ok(BudgetCode {
        budget_code_id: row.try_get("budget_code_id")?,
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        code_type: code_type.parse()?,
        category: row.try_get("category")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn budget_target_from_row(row: &SqliteRow) -> Result<BudgetTarget> {
    let amount: String = row.try_get("target_amount")?;
    let month: i64 = row.try_get("month")?;
    let year: i64 = row.try_get("year")?;

    Ok(BudgetTarget {
        budget_target_id: row.try_get("budget_target_id")?,
        budget_code_id: row.try_get("budget_code_id")?,
        month: month as u32,
        year: year as i32,
        target_amount: parse_amount(&amount)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_unique_violation(e: sqlx::Error, what: &str) -> DashboardError {
    let unique = e.as_database_error().is_some_and(|db| db.is_unique_violation());
    if unique {
        DashboardError::BadRequest(format!("{what} already exists"))
    } else {
        DashboardError::Database(e)
    }
}

/*==========Sales / Record Source=========== */

/// All rows dated in `[from, until)`, decoded into aggregation records.
pub async fn fetch_records_between(
    pool: &Pool<Sqlite>,
    from: NaiveDate,
    until: NaiveDate,
) -> Result<Vec<Record>> {
    let rows = sqlx::query(&format!(
        "SELECT {SALE_COLUMNS} FROM sales WHERE entry_date >= ? AND entry_date < ? ORDER BY entry_date, sale_id"
    ))
    .bind(iso(&from))
    .bind(iso(&until))
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| sale_from_row(row).map(|sale| sale.to_record()))
        .collect()
}

pub async fn fetch_records_for_year(pool: &Pool<Sqlite>, year: i32) -> Result<Vec<Record>> {
    fetch_records_for_years(pool, year, year).await
}

/// Rows for every year in `first..=last`.
pub async fn fetch_records_for_years(pool: &Pool<Sqlite>, first: i32, last: i32) -> Result<Vec<Record>> {
    fetch_records_between(pool, month_start(first, 1)?, month_start(last + 1, 1)?).await
}

/// Realization and expense rows, newest first.
pub async fn list_realizations(pool: &Pool<Sqlite>, filter: &SaleQuery) -> Result<Vec<Sale>> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {SALE_COLUMNS} FROM sales WHERE kind IN ('Realization', 'Expense')"
    ));

    if let Some(kind) = &filter.kind {
        let kind: RecordKind = kind.parse()?;
        qb.push(" AND kind = ").push_bind(kind.as_str());
    }
    if let Some(year) = filter.year {
        qb.push(" AND CAST(strftime('%Y', entry_date) AS INTEGER) = ")
            .push_bind(i64::from(year));
    }
    if let Some(month) = filter.month {
        qb.push(" AND CAST(strftime('%m', entry_date) AS INTEGER) = ")
            .push_bind(i64::from(month));
    }
    if let Some(code_id) = filter.budget_code_id {
        qb.push(" AND budget_code_id = ").push_bind(code_id);
    }
    qb.push(" ORDER BY entry_date DESC, sale_id DESC");

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(sale_from_row).collect()
}

pub async fn get_sale(pool: &Pool<Sqlite>, sale_id: i64) -> Result<Sale> {
    let row = sqlx::query(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE sale_id = ?"))
        .bind(sale_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DashboardError::NotFound("sale"))?;

    sale_from_row(&row)
}

pub async fn create_sale(pool: &Pool<Sqlite>, sale: &NewSale) -> Result<Sale> {
    let kind: RecordKind = sale.kind.parse()?;
    let amount = check_amount(sale.amount)?;

    let row = sqlx::query(&format!(
        r#"
        INSERT INTO sales (entry_date, amount, kind, product, income_name, note, entered_by, budget_code_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {SALE_COLUMNS}
        "#
    ))
    .bind(iso(&sale.entry_date))
    .bind(amount.to_string())
    .bind(kind.as_str())
    .bind(sale.product.as_deref())
    .bind(sale.income_name.as_deref())
    .bind(sale.note.as_deref())
    .bind(sale.entered_by.as_deref())
    .bind(sale.budget_code_id)
    .fetch_one(pool)
    .await?;

    sale_from_row(&row)
}

pub async fn update_sale(pool: &Pool<Sqlite>, sale_id: i64, sale: &NewSale) -> Result<Sale> {
    let kind: RecordKind = sale.kind.parse()?;
    let amount = check_amount(sale.amount)?;

    let row = sqlx::query(&format!(
        r#"
        UPDATE sales
        SET entry_date = ?, amount = ?, kind = ?, product = ?, income_name = ?,
            note = ?, budget_code_id = ?, updated_at = datetime('now')
        WHERE sale_id = ?
        RETURNING {SALE_COLUMNS}
        "#
    ))
    .bind(iso(&sale.entry_date))
    .bind(amount.to_string())
    .bind(kind.as_str())
    .bind(sale.product.as_deref())
    .bind(sale.income_name.as_deref())
    .bind(sale.note.as_deref())
    .bind(sale.budget_code_id)
    .bind(sale_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DashboardError::NotFound("sale"))?;

    sale_from_row(&row)
}

pub async fn delete_sale(pool: &Pool<Sqlite>, sale_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM sales WHERE sale_id = ?")
        .bind(sale_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DashboardError::NotFound("sale"));
    }
    Ok(())
}

/* Replace the month-start target/realization rows of one product for a whole
year. Non-positive values leave the month empty. Runs in one transaction. */
pub async fn replace_product_month_values(
    pool: &Pool<Sqlite>,
    product: &str,
    year: i32,
    targets: &[Decimal],
    realizations: &[Decimal],
) -> Result<()> {
    if targets.len() != MONTHS_PER_YEAR || realizations.len() != MONTHS_PER_YEAR {
        return Err(DashboardError::BadRequest(
            "target and realization must each contain 12 monthly values".to_string(),
        ));
    }
    for value in targets.iter().chain(realizations) {
        check_amount(*value)?;
    }

    let mut tx = pool.begin().await?;

    for (index, (target, realization)) in targets.iter().zip(realizations).enumerate() {
        let day = month_start(year, index as u32 + 1)?;

        sqlx::query(
            "DELETE FROM sales WHERE entry_date = ? AND product = ? AND kind IN ('Target', 'Realization')",
        )
        .bind(iso(&day))
        .bind(product)
        .execute(&mut *tx)
        .await?;

        for (kind, value) in [(RecordKind::Target, target), (RecordKind::Realization, realization)] {
            if *value > Decimal::ZERO {
                insert_month_value(&mut tx, day, *value, kind, product).await?;
            }
        }
    }

    tx.commit().await?;
    tracing::info!(product, year, "replaced monthly product values");
    Ok(())
}

async fn insert_month_value(
    conn: &mut SqliteConnection,
    day: NaiveDate,
    value: Decimal,
    kind: RecordKind,
    product: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (entry_date, amount, kind, product, income_name)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(iso(&day))
    .bind(value.to_string())
    .bind(kind.as_str())
    .bind(product)
    .bind(format!("{product} {kind}"))
    .execute(conn)
    .await?;
    Ok(())
}

/*==========Budget Code Queries=========== */

pub async fn create_budget_code(pool: &Pool<Sqlite>, code: &NewBudgetCode) -> Result<BudgetCode> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO budget_codes (code, name, code_type, category, description)
        VALUES (?, ?, ?, ?, ?)
        RETURNING {BUDGET_CODE_COLUMNS}
        "#
    ))
    .bind(&code.code)
    .bind(&code.name)
    .bind(code.code_type.as_str())
    .bind(code.category.as_deref())
    .bind(code.description.as_deref())
    .fetch_one(pool)
    .await
    .map_err(|e| map_unique_violation(e, "budget code"))?;

    budget_code_from_row(&row)
}

pub async fn list_budget_codes(pool: &Pool<Sqlite>, filter: &BudgetCodeQuery) -> Result<Vec<BudgetCode>> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {BUDGET_CODE_COLUMNS} FROM budget_codes WHERE 1 = 1"));

    if let Some(code_type) = filter.code_type {
        qb.push(" AND code_type = ").push_bind(code_type.as_str());
    }
    if let Some(category) = &filter.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    qb.push(" ORDER BY code");

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(budget_code_from_row).collect()
}

async fn find_budget_code(conn: &mut SqliteConnection, budget_code_id: i64) -> Result<Option<BudgetCode>> {
    let row = sqlx::query(&format!(
        "SELECT {BUDGET_CODE_COLUMNS} FROM budget_codes WHERE budget_code_id = ?"
    ))
    .bind(budget_code_id)
    .fetch_optional(conn)
    .await?;

    row.as_ref().map(budget_code_from_row).transpose()
}

pub async fn update_budget_code(
    pool: &Pool<Sqlite>,
    budget_code_id: i64,
    code: &NewBudgetCode,
) -> Result<BudgetCode> {
    let row = sqlx::query(&format!(
        r#"
        UPDATE budget_codes
        SET code = ?, name = ?, code_type = ?, category = ?, description = ?, updated_at = datetime('now')
        WHERE budget_code_id = ?
        RETURNING {BUDGET_CODE_COLUMNS}
        "#
    ))
    .bind(&code.code)
    .bind(&code.name)
    .bind(code.code_type.as_str())
    .bind(code.category.as_deref())
    .bind(code.description.as_deref())
    .bind(budget_code_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| map_unique_violation(e, "budget code"))?
    .ok_or(DashboardError::NotFound("budget code"))?;

    budget_code_from_row(&row)
}

pub async fn delete_budget_code(pool: &Pool<Sqlite>, budget_code_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM budget_codes WHERE budget_code_id = ?")
        .bind(budget_code_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DashboardError::NotFound("budget code"));
    }
    Ok(())
}

/// Product registry: names of all REVENUE budget codes.
pub async fn revenue_product_names(pool: &Pool<Sqlite>) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT name FROM budget_codes WHERE code_type = 'REVENUE' ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(names)
}

/*==========Budget Target Queries=========== */

/* Targets on REVENUE codes are mirrored into `sales` as a Target row dated on
the first of the month, labelled with the code's name as product. */
pub async fn create_budget_target(pool: &Pool<Sqlite>, target: &NewBudgetTarget) -> Result<BudgetTarget> {
    let day = month_start(target.year, target.month)?;
    check_amount(target.target_amount)?;
    let mut tx = pool.begin().await?;

    let code = target_code(&mut tx, target.budget_code_id).await?;

    let row = sqlx::query(&format!(
        r#"
        INSERT INTO budget_targets (budget_code_id, month, year, target_amount)
        VALUES (?, ?, ?, ?)
        RETURNING {BUDGET_TARGET_COLUMNS}
        "#
    ))
    .bind(target.budget_code_id)
    .bind(i64::from(target.month))
    .bind(i64::from(target.year))
    .bind(target.target_amount.to_string())
    .fetch_one(&mut *tx)
    .await?;
    let created = budget_target_from_row(&row)?;

    sync_target_to_sales(&mut tx, &code, day, target.target_amount, target.entered_by.as_deref()).await?;

    tx.commit().await?;
    Ok(created)
}

pub async fn list_budget_targets(pool: &Pool<Sqlite>, filter: &BudgetTargetQuery) -> Result<Vec<BudgetTarget>> {
    let mut qb =
        QueryBuilder::<Sqlite>::new(format!("SELECT {BUDGET_TARGET_COLUMNS} FROM budget_targets WHERE 1 = 1"));

    if let Some(code_id) = filter.budget_code_id {
        qb.push(" AND budget_code_id = ").push_bind(code_id);
    }
    if let Some(month) = filter.month {
        qb.push(" AND month = ").push_bind(i64::from(month));
    }
    if let Some(year) = filter.year {
        qb.push(" AND year = ").push_bind(i64::from(year));
    }
    qb.push(" ORDER BY year, month");

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(budget_target_from_row).collect()
}

pub async fn update_budget_target(
    pool: &Pool<Sqlite>,
    budget_target_id: i64,
    month: u32,
    year: i32,
    target_amount: Decimal,
) -> Result<BudgetTarget> {
    let day = month_start(year, month)?;
    check_amount(target_amount)?;
    let mut tx = pool.begin().await?;

    let existing = find_budget_target(&mut tx, budget_target_id).await?;
    let code = target_code(&mut tx, existing.budget_code_id).await?;
    clear_synced_target(&mut tx, code.budget_code_id, month_start(existing.year, existing.month)?).await?;

    let row = sqlx::query(&format!(
        r#"
        UPDATE budget_targets
        SET month = ?, year = ?, target_amount = ?, updated_at = datetime('now')
        WHERE budget_target_id = ?
        RETURNING {BUDGET_TARGET_COLUMNS}
        "#
    ))
    .bind(i64::from(month))
    .bind(i64::from(year))
    .bind(target_amount.to_string())
    .bind(budget_target_id)
    .fetch_one(&mut *tx)
    .await?;
    let updated = budget_target_from_row(&row)?;

    sync_target_to_sales(&mut tx, &code, day, target_amount, None).await?;

    tx.commit().await?;
    Ok(updated)
}

pub async fn delete_budget_target(pool: &Pool<Sqlite>, budget_target_id: i64) -> Result<()> {
    let mut tx = pool.begin().await?;

    let existing = find_budget_target(&mut tx, budget_target_id).await?;
    clear_synced_target(&mut tx, existing.budget_code_id, month_start(existing.year, existing.month)?).await?;

    sqlx::query("DELETE FROM budget_targets WHERE budget_target_id = ?")
        .bind(budget_target_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

async fn find_budget_target(conn: &mut SqliteConnection, budget_target_id: i64) -> Result<BudgetTarget> {
    let row = sqlx::query(&format!(
        "SELECT {BUDGET_TARGET_COLUMNS} FROM budget_targets WHERE budget_target_id = ?"
    ))
    .bind(budget_target_id)
    .fetch_optional(conn)
    .await?
    .ok_or(DashboardError::NotFound("budget target"))?;

    budget_target_from_row(&row)
}

/// The code a target hangs off; must exist and be REVENUE or EXPENSE.
async fn target_code(conn: &mut SqliteConnection, budget_code_id: i64) -> Result<BudgetCode> {
    match find_budget_code(conn, budget_code_id).await? {
        Some(code) if code.code_type.accepts_targets() => Ok(code),
        _ => Err(DashboardError::BadRequest(format!(
            "budget code {budget_code_id} does not exist or is not a REVENUE/EXPENSE code"
        ))),
    }
}

async fn clear_synced_target(conn: &mut SqliteConnection, budget_code_id: i64, month: NaiveDate) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM sales
        WHERE budget_code_id = ? AND kind = 'Target' AND entry_date >= ? AND entry_date < ?
        "#,
    )
    .bind(budget_code_id)
    .bind(iso(&month))
    .bind(iso(&next_month_start(month)?))
    .execute(conn)
    .await?;
    Ok(())
}

async fn sync_target_to_sales(
    conn: &mut SqliteConnection,
    code: &BudgetCode,
    month: NaiveDate,
    amount: Decimal,
    entered_by: Option<&str>,
) -> Result<()> {
    if code.code_type != BudgetCodeType::Revenue {
        return Ok(());
    }

    clear_synced_target(conn, code.budget_code_id, month).await?;

    if amount > Decimal::ZERO {
        sqlx::query(
            r#"
            INSERT INTO sales (entry_date, amount, kind, product, income_name, entered_by, budget_code_id)
            VALUES (?, ?, 'Target', ?, 'Target from budget', ?, ?)
            "#,
        )
        .bind(iso(&month))
        .bind(amount.to_string())
        .bind(&code.name)
        .bind(entered_by)
        .bind(code.budget_code_id)
        .execute(conn)
        .await?;
    }

    tracing::debug!(
        product = %code.name,
        year = month.year(),
        month = month.month(),
        %amount,
        "synced budget target into sales"
    );
    Ok(())
}
