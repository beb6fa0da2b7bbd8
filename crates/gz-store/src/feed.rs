use anyhow::Result;
use chrono::{DateTime, Utc};
use gz_runtime::LedgerFeed;
use gz_schemas::{ProductRecord, SaleLineItem, StockHistoryEntry};
use sqlx::PgPool;
use uuid::Uuid;

/// Postgres-backed [`LedgerFeed`].
#[derive(Clone)]
pub struct PgLedgerFeed {
    pool: PgPool,
}

impl PgLedgerFeed {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl LedgerFeed for PgLedgerFeed {
    async fn product(&self, product_id: Uuid) -> Result<Option<ProductRecord>> {
        crate::fetch_product(&self.pool, product_id).await
    }

    async fn history(&self, product_id: Uuid) -> Result<Vec<StockHistoryEntry>> {
        crate::fetch_history(&self.pool, product_id).await
    }

    async fn history_window(
        &self,
        product_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StockHistoryEntry>> {
        crate::fetch_history_window(&self.pool, product_id, from, to).await
    }

    async fn last_entry_before(
        &self,
        product_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<StockHistoryEntry>> {
        crate::fetch_last_entry_before(&self.pool, product_id, at).await
    }

    async fn sale_lines(&self, product_id: Uuid) -> Result<Vec<SaleLineItem>> {
        crate::fetch_sale_lines(&self.pool, product_id).await
    }

    async fn product_ids(&self) -> Result<Vec<Uuid>> {
        crate::list_product_ids(&self.pool).await
    }
}
