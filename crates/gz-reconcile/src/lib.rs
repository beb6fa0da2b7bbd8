//! gz-reconcile
//!
//! Stock Ledger Reconciliation Engine
//!
//! Architectural decisions:
//! - The stock-history ledger is append-only; this crate only reads it
//! - Sold volume comes from sale line items, never from the ledger
//! - Reason strings are normalized once into a closed tag enumeration
//! - Negative reconstructed stock is surfaced, never clamped
//! - A nonzero discrepancy is data, not an error — the engine always completes
//!
//! Deterministic, pure logic. No IO, no wall-clock, no randomness.

mod balance;
mod classify;
mod daily;
mod period;
mod report;
mod types;

pub use balance::{opening_stock, reconstruct};
pub use classify::{
    classify_entry, classify_period_entry, normalize_reason, Classification, FallbackPolicy,
    ReasonTag,
};
pub use daily::{aggregate_daily, DayBoundary};
pub use period::{period_summary, PeriodWindow};
pub use report::{reconcile, EngineConfig};
pub use types::{
    DailyBreakdownRow, DailyBuckets, DailyMovementBucket, MovementKind, MovementTotals,
    PeriodSummaryRow, ReconciliationResult,
};
