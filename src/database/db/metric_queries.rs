use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use crate::aggregation::percentage_of;
use crate::database::db::util::parse_amount;
use crate::database::models::{KmMetric, KmMetricUpdate};
use crate::error::{DashboardError, Result};

fn metric_from_row(row: &SqliteRow) -> Result<KmMetric> {
    let target: String = row.try_get("target")?;
    let ytd: String = row.try_get("ytd")?;
    let achievement: String = row.try_get("achievement")?;

    Ok(KmMetric {
        metric_id: row.try_get("metric_id")?,
        category: row.try_get("category")?,
        name: row.try_get("name")?,
        target: parse_amount(&target)?,
        ytd: parse_amount(&ytd)?,
        achievement: parse_amount(&achievement)?,
    })
}

/*==========KM Metric Queries=========== */

pub async fn list_metrics(pool: &Pool<Sqlite>) -> Result<Vec<KmMetric>> {
    let rows = sqlx::query(
        "SELECT metric_id, category, name, target, ytd, achievement FROM km_metrics ORDER BY category, metric_id",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(metric_from_row).collect()
}

/// Applies every update or none of them. Missing achievements are derived
/// as `ytd / target`.
pub async fn update_metrics(pool: &Pool<Sqlite>, updates: &[KmMetricUpdate]) -> Result<usize> {
    if updates.is_empty() {
        return Err(DashboardError::BadRequest("no metrics to update".to_string()));
    }

    let mut tx = pool.begin().await?;

    for update in updates {
        let achievement = update
            .achievement
            .unwrap_or_else(|| percentage_of(update.ytd, update.target));

        let result = sqlx::query("UPDATE km_metrics SET target = ?, ytd = ?, achievement = ? WHERE metric_id = ?")
            .bind(update.target.to_string())
            .bind(update.ytd.to_string())
            .bind(achievement.to_string())
            .bind(update.metric_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // dropping `tx` rolls back the earlier updates
            return Err(DashboardError::NotFound("metric"));
        }
    }

    tx.commit().await?;
    tracing::info!(count = updates.len(), "updated km metrics");
    Ok(updates.len())
}
