use anyhow::Result;
use chrono::{DateTime, Utc};
use gz_schemas::{ProductRecord, SaleLineItem, StockHistoryEntry};
use uuid::Uuid;

/// Read-only persistence seam the reconciliation service runs against.
///
/// Implementations: `PgLedgerFeed` (gz-store) for Postgres,
/// `MemoryLedgerFeed` (gz-testkit) for scenario tests.
///
/// All methods return plain `anyhow::Result`: at this seam a collaborator
/// failure is an opaque storage error; the service layer tags it as
/// [`ServiceError::Storage`](crate::ServiceError::Storage).
#[async_trait::async_trait]
pub trait LedgerFeed: Send + Sync {
    /// Live product record, `None` if the product does not exist.
    async fn product(&self, product_id: Uuid) -> Result<Option<ProductRecord>>;

    /// Full stock-history ledger for a product, ordered by `recorded_at`.
    async fn history(&self, product_id: Uuid) -> Result<Vec<StockHistoryEntry>>;

    /// Ledger slice with `from <= recorded_at < to`, ordered by `recorded_at`.
    async fn history_window(
        &self,
        product_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StockHistoryEntry>>;

    /// Most recent ledger entry strictly before `at`, if any.
    async fn last_entry_before(
        &self,
        product_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<StockHistoryEntry>>;

    /// All sale line items for a product, carrying the parent sale timestamp.
    async fn sale_lines(&self, product_id: Uuid) -> Result<Vec<SaleLineItem>>;

    /// Every product id in the catalog, in a stable order.
    async fn product_ids(&self) -> Result<Vec<Uuid>>;
}
