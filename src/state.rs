use std::sync::Arc;

use tracing::{error, info};

use crate::config::AppConfig;
use crate::db::Store;
use crate::products::seed::seed_records;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Opens the store and seeds it. A store that cannot be opened is fatal;
    /// a failed seed is logged and the service starts with what it has.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store = Store::initialize(&config.database_url)
            .await
            .inspect_err(|e| error!(error = %format!("{e:#}"), "database initialization failed"))?;
        let state = Self::from_parts(store, Arc::new(config));
        state.seed().await;
        Ok(state)
    }

    pub fn from_parts(store: Store, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    async fn seed(&self) {
        let seeded: anyhow::Result<i64> = async {
            let records = seed_records(self.config.seed_file.as_deref())?;
            self.store.seed(&records).await?;
            self.store.count().await
        }
        .await;
        match seeded {
            Ok(rows) => info!(rows, "product data inserted into the database"),
            Err(e) => error!(error = %format!("{e:#}"), "seeding product data failed"),
        }
    }

    /// In-memory store holding the sample records.
    #[cfg(test)]
    pub async fn seeded() -> Self {
        let store = Store::in_memory().await.expect("in-memory store");
        store
            .seed(&crate::products::seed::sample_records())
            .await
            .expect("seed sample records");
        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            host: "127.0.0.1".into(),
            port: 0,
            seed_file: None,
        });
        Self::from_parts(store, config)
    }
}
