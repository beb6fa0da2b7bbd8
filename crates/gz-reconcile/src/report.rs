//! Full reconciliation: aggregate, reconstruct, compare against the live
//! counter.

use gz_schemas::{ProductRecord, SaleLineItem, StockHistoryEntry};
use serde::{Deserialize, Serialize};

use crate::balance::{opening_stock, reconstruct};
use crate::classify::FallbackPolicy;
use crate::daily::{aggregate_daily, DayBoundary};
use crate::types::{MovementTotals, ReconciliationResult};

/// Knobs for one engine run. `Default` matches legacy behavior: legacy
/// fallback classification, timezone-naive (UTC) day truncation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub fallback: FallbackPolicy,
    pub day_boundary: DayBoundary,
}

/// Reconcile one product's ledger against its live stock counter.
///
/// Pure: `entries` must be the product's full chronological ledger and
/// `sales` its sale line items; the caller owns all IO. A nonzero
/// `discrepancy` or negative reconstructed balance is returned as data —
/// this function never fails.
pub fn reconcile(
    product: &ProductRecord,
    entries: &[StockHistoryEntry],
    sales: &[SaleLineItem],
    config: EngineConfig,
) -> ReconciliationResult {
    let buckets = aggregate_daily(entries, sales, config.day_boundary, config.fallback);
    let opening = opening_stock(entries);
    let rows = reconstruct(&buckets, opening);

    let mut totals = MovementTotals::default();
    for row in &rows {
        totals.items_sold += row.items_sold;
        totals.stock_added += row.stock_added;
        totals.transfer_out += row.transfer_out;
        totals.return_in += row.return_in;
        totals.return_out += row.return_out;
    }
    totals.unclassified = buckets.values().map(|b| b.unclassified).sum();

    let calculated_closing_stock = rows.last().map(|r| r.ending_stock).unwrap_or(opening);

    ReconciliationResult {
        product_id: product.product_id,
        current_stock: product.current_stock,
        opening_stock: opening,
        totals,
        calculated_closing_stock,
        discrepancy: product.current_stock - calculated_closing_stock,
        daily_breakdown: rows,
    }
}
