use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The five movement kinds a classified ledger entry (or sale line) can
/// contribute to. Stable ordering for deterministic output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    ItemsSold,
    StockAdded,
    TransferOut,
    ReturnIn,
    ReturnOut,
}

/// Per-day movement accumulators. Built fresh per reconciliation run.
///
/// `unclassified` only accumulates under [`FallbackPolicy::Strict`]; under
/// the legacy policy unmatched entries are dropped without trace.
///
/// [`FallbackPolicy::Strict`]: crate::FallbackPolicy::Strict
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMovementBucket {
    pub items_sold: i64,
    pub stock_added: i64,
    pub transfer_out: i64,
    pub return_in: i64,
    pub return_out: i64,
    pub unclassified: i64,
}

impl DailyMovementBucket {
    /// Add a classified magnitude to exactly one field.
    pub fn add(&mut self, kind: MovementKind, magnitude: i64) {
        match kind {
            MovementKind::ItemsSold => self.items_sold += magnitude,
            MovementKind::StockAdded => self.stock_added += magnitude,
            MovementKind::TransferOut => self.transfer_out += magnitude,
            MovementKind::ReturnIn => self.return_in += magnitude,
            MovementKind::ReturnOut => self.return_out += magnitude,
        }
    }

    /// Whether the bucket has already recorded inbound stock
    /// (`stock_added` or `return_in`). The legacy fallback rule keys on this.
    pub fn has_inbound(&self) -> bool {
        self.stock_added > 0 || self.return_in > 0
    }

    /// Net signed effect of this bucket on the stock level.
    pub fn net_change(&self) -> i64 {
        self.stock_added + self.return_in - self.items_sold - self.transfer_out - self.return_out
    }
}

/// Ordered mapping from calendar day to its movement bucket.
pub type DailyBuckets = BTreeMap<NaiveDate, DailyMovementBucket>;

/// One reconstructed day: opening balance, movement totals, closing balance.
///
/// Invariants (enforced by construction, pinned by tests):
/// - `ending_stock = starting_stock - items_sold + stock_added - transfer_out
///   + return_in - return_out`
/// - consecutive rows chain: `row[i+1].starting_stock == row[i].ending_stock`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBreakdownRow {
    pub date: NaiveDate,
    pub starting_stock: i64,
    pub items_sold: i64,
    pub stock_added: i64,
    pub transfer_out: i64,
    pub return_in: i64,
    pub return_out: i64,
    pub ending_stock: i64,
}

/// Movement totals re-summed across all days.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementTotals {
    pub items_sold: i64,
    pub stock_added: i64,
    pub transfer_out: i64,
    pub return_in: i64,
    pub return_out: i64,
    /// Nonzero only under the strict fallback policy.
    pub unclassified: i64,
}

/// Full reconciliation output for one product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub product_id: Uuid,
    /// Live counter read from the product record — authoritative.
    pub current_stock: i64,
    /// Stock level before the chronologically first ledger entry.
    pub opening_stock: i64,
    pub totals: MovementTotals,
    /// Last row's `ending_stock`, or `opening_stock` with zero days.
    pub calculated_closing_stock: i64,
    /// `current_stock - calculated_closing_stock`. Zero means the ledger
    /// fully explains the live counter; nonzero means drift.
    pub discrepancy: i64,
    pub daily_breakdown: Vec<DailyBreakdownRow>,
}

impl ReconciliationResult {
    /// `true` when the ledger fully explains the live stock counter.
    pub fn is_clean(&self) -> bool {
        self.discrepancy == 0
    }

    /// `true` if any reconstructed balance went negative — a data-quality
    /// signal, surfaced rather than corrected.
    pub fn has_negative_balance(&self) -> bool {
        self.daily_breakdown
            .iter()
            .any(|r| r.starting_stock < 0 || r.ending_stock < 0)
    }
}

/// Windowed per-product summary: opening stock at the window boundary, net
/// movement inside the window, and end-of-period inventory valuation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummaryRow {
    pub product_id: Uuid,
    pub product_name: String,
    pub opening_stock: i64,
    pub stock_in: i64,
    pub items_sold: i64,
    pub transfer_out: i64,
    pub return_in: i64,
    pub return_out: i64,
    pub closing_stock: i64,
    /// `closing_stock * cost_price_micros` — last-known unit cost, not
    /// cost-layer/FIFO accurate.
    pub revaluation_micros: i64,
}
