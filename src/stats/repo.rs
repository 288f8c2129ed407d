use anyhow::Context;
use sqlx::SqlitePool;

use super::dto::{CategoryCount, Statistics};
use super::month::Month;

// Months are matched on characters 6-7 of the stored RFC 3339 text
// (`YYYY-MM-...`), i.e. in the record's own UTC offset.
pub async fn statistics_for_month(db: &SqlitePool, month: Month) -> anyhow::Result<Statistics> {
    let stats = sqlx::query_as::<_, Statistics>(
        r#"
        SELECT CAST(COALESCE(SUM(price), 0) AS REAL) AS total_sale_amount,
               COALESCE(SUM(CASE WHEN sold = 1 THEN 1 ELSE 0 END), 0) AS total_sold_items,
               COALESCE(SUM(CASE WHEN sold = 0 THEN 1 ELSE 0 END), 0) AS total_not_sold_items
          FROM products
         WHERE substr(dateOfSale, 6, 2) = ?
        "#,
    )
    .bind(month.to_string())
    .fetch_one(db)
    .await
    .context("query month statistics")?;
    Ok(stats)
}

/// Prices of every record sold in `month`, sold flag ignored.
pub async fn prices_for_month(db: &SqlitePool, month: Month) -> anyhow::Result<Vec<f64>> {
    let prices = sqlx::query_scalar::<_, f64>(
        r#"
        SELECT CAST(price AS REAL)
          FROM products
         WHERE substr(dateOfSale, 6, 2) = ?
        "#,
    )
    .bind(month.to_string())
    .fetch_all(db)
    .await
    .context("query month prices")?;
    Ok(prices)
}

pub async fn categories_for_month(
    db: &SqlitePool,
    month: Month,
) -> anyhow::Result<Vec<CategoryCount>> {
    let rows = sqlx::query_as::<_, CategoryCount>(
        r#"
        SELECT category, COUNT(*) AS count
          FROM products
         WHERE substr(dateOfSale, 6, 2) = ?
         GROUP BY category
         ORDER BY category
        "#,
    )
    .bind(month.to_string())
    .fetch_all(db)
    .await
    .context("query month categories")?;
    Ok(rows)
}
