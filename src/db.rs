use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::{debug, info};

use crate::products::TransactionRecord;

/// Handle to the SQLite database holding the `products` table.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens the database at `database_url`, creating the file and the
    /// `products` table when they are absent.
    pub async fn initialize(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("parse database url {}", database_url))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("open database {}", database_url))?;
        let store = Self { pool };
        store.ensure_schema().await?;
        info!(%database_url, "database initialized");
        Ok(store)
    }

    /// Private in-memory database. A single pinned connection keeps the data
    /// alive for the lifetime of the pool.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("open in-memory database")?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY,
                title TEXT,
                price REAL,
                description TEXT,
                category TEXT,
                image TEXT,
                sold BOOLEAN,
                dateOfSale TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("create products table")?;
        Ok(())
    }

    /// Upserts `records` by id in a single transaction, so re-seeding an
    /// existing database neither fails nor duplicates rows.
    pub async fn seed(&self, records: &[TransactionRecord]) -> anyhow::Result<u64> {
        let mut tx = self.pool.begin().await.context("begin seed tx")?;
        let mut written = 0;
        for r in records {
            let res = sqlx::query(
                r#"
                INSERT INTO products (id, title, price, description, category, image, sold, dateOfSale)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    price = excluded.price,
                    description = excluded.description,
                    category = excluded.category,
                    image = excluded.image,
                    sold = excluded.sold,
                    dateOfSale = excluded.dateOfSale
                "#,
            )
            .bind(r.id)
            .bind(&r.title)
            .bind(r.price)
            .bind(&r.description)
            .bind(&r.category)
            .bind(&r.image)
            .bind(r.sold)
            .bind(&r.date_of_sale)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("upsert product {}", r.id))?;
            written += res.rows_affected();
        }
        tx.commit().await.context("commit seed tx")?;
        debug!(written, "products seeded");
        Ok(written)
    }

    pub async fn count(&self) -> anyhow::Result<i64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .context("count products")?;
        Ok(n)
    }

    /// Read access for the aggregation queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
