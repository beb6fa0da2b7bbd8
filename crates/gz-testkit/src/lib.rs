//! gz-testkit
//!
//! Deterministic in-memory [`LedgerFeed`] for scenario tests. No IO, no
//! Postgres; feed ordering matches what gz-store guarantees (history sorted
//! by `recorded_at`, catalog sorted by product id).

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use gz_runtime::LedgerFeed;
use gz_schemas::{MovementType, ProductRecord, SaleLineItem, StockHistoryEntry};
use uuid::Uuid;

/// In-memory ledger feed. Build it up with the `insert_*`/`push_*` helpers,
/// then hand it to the service behind an `Arc`.
#[derive(Default)]
pub struct MemoryLedgerFeed {
    products: BTreeMap<Uuid, ProductRecord>,
    history: BTreeMap<Uuid, Vec<StockHistoryEntry>>,
    sales: BTreeMap<Uuid, Vec<SaleLineItem>>,
}

impl MemoryLedgerFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_product(&mut self, product: ProductRecord) {
        self.products.insert(product.product_id, product);
    }

    pub fn push_entry(&mut self, entry: StockHistoryEntry) {
        let entries = self.history.entry(entry.product_id).or_default();
        entries.push(entry);
        entries.sort_by_key(|e| e.recorded_at);
    }

    pub fn push_sale(&mut self, line: SaleLineItem) {
        let lines = self.sales.entry(line.product_id).or_default();
        lines.push(line);
        lines.sort_by_key(|l| l.sold_at);
    }

    /// Shorthand: a ledger entry with explicit before/after stock levels.
    pub fn push_movement(
        &mut self,
        product_id: Uuid,
        recorded_at: DateTime<Utc>,
        old_stock: i64,
        new_stock: i64,
        movement_type: MovementType,
        reason: &str,
    ) {
        self.push_entry(StockHistoryEntry {
            product_id,
            recorded_at,
            old_stock: Some(old_stock),
            new_stock: Some(new_stock),
            quantity_change: new_stock - old_stock,
            movement_type,
            reason: Some(reason.to_string()),
        });
    }
}

#[async_trait::async_trait]
impl LedgerFeed for MemoryLedgerFeed {
    async fn product(&self, product_id: Uuid) -> Result<Option<ProductRecord>> {
        Ok(self.products.get(&product_id).cloned())
    }

    async fn history(&self, product_id: Uuid) -> Result<Vec<StockHistoryEntry>> {
        Ok(self.history.get(&product_id).cloned().unwrap_or_default())
    }

    async fn history_window(
        &self,
        product_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StockHistoryEntry>> {
        Ok(self
            .history
            .get(&product_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| from <= e.recorded_at && e.recorded_at < to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn last_entry_before(
        &self,
        product_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<StockHistoryEntry>> {
        Ok(self
            .history
            .get(&product_id)
            .and_then(|entries| entries.iter().rev().find(|e| e.recorded_at < at))
            .cloned())
    }

    async fn sale_lines(&self, product_id: Uuid) -> Result<Vec<SaleLineItem>> {
        Ok(self.sales.get(&product_id).cloned().unwrap_or_default())
    }

    async fn product_ids(&self) -> Result<Vec<Uuid>> {
        Ok(self.products.keys().copied().collect())
    }
}
