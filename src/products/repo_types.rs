use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Product transaction row in the `products` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: i64,               // primary key
    pub title: String,
    pub price: f64,            // non-negative
    pub description: String,
    pub category: String,
    pub image: String,         // image URI
    pub sold: bool,
    #[sqlx(rename = "dateOfSale")]
    pub date_of_sale: String,  // RFC 3339 with offset
}

impl TransactionRecord {
    /// Checks the row invariants enforced before a record reaches the store.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.price.is_finite() && self.price >= 0.0,
            "record {}: price must be a non-negative number, got {}",
            self.id,
            self.price
        );
        self.sale_time()?;
        Ok(())
    }

    pub fn sale_time(&self) -> anyhow::Result<OffsetDateTime> {
        OffsetDateTime::parse(&self.date_of_sale, &Rfc3339).map_err(|e| {
            anyhow::anyhow!(
                "record {}: invalid dateOfSale {:?}: {}",
                self.id,
                self.date_of_sale,
                e
            )
        })
    }
}
