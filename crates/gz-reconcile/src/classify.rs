//! Ledger event classification.
//!
//! # Design
//!
//! Free-text `reason` strings are normalized exactly once into the closed
//! [`ReasonTag`] enumeration; the ordered rule tables below are the single
//! source of truth for how a ledger entry lands in a bucket field. Two rule
//! tables exist on purpose:
//!
//! - [`classify_entry`] — full reconciliation. Sold volume is **not**
//!   produced here (it comes from sale line items); the catch-all behavior
//!   is governed by [`FallbackPolicy`].
//! - [`classify_period_entry`] — period summary variant. Uses the coarse
//!   `movement_type` label as a primary signal and is total: every entry
//!   lands somewhere.

use gz_schemas::{MovementType, StockHistoryEntry};
use serde::{Deserialize, Serialize};

use crate::types::{DailyMovementBucket, MovementKind};

// ---------------------------------------------------------------------------
// Reason normalization
// ---------------------------------------------------------------------------

/// Substrings that mark a reason as procurement-driven stock intake.
const PROCUREMENT_HINTS: &[&str] = &["purchase", "invoice", "supplier", "session"];

/// Closed enumeration of recognized reason phrases.
///
/// Exact phrases win over the procurement substring rule, so
/// `"return to supplier"` normalizes to [`ReasonTag::SupplierReturn`] even
/// though it contains `"supplier"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonTag {
    TransferOut,
    CustomerReturn,
    SupplierReturn,
    Procurement,
    Other,
}

/// Normalize a raw reason string into a [`ReasonTag`].
///
/// Matching is on the trimmed, ASCII-lowercased reason; a missing reason is
/// [`ReasonTag::Other`].
pub fn normalize_reason(reason: Option<&str>) -> ReasonTag {
    let r = match reason {
        Some(r) => r.trim().to_ascii_lowercase(),
        None => return ReasonTag::Other,
    };
    match r.as_str() {
        "transfer out" => ReasonTag::TransferOut,
        "customer return" | "return in" => ReasonTag::CustomerReturn,
        "return to supplier" | "return out" => ReasonTag::SupplierReturn,
        _ if PROCUREMENT_HINTS.iter().any(|h| r.contains(h)) => ReasonTag::Procurement,
        _ => ReasonTag::Other,
    }
}

// ---------------------------------------------------------------------------
// Fallback policy
// ---------------------------------------------------------------------------

/// What to do with an entry no explicit rule matches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Preserve the legacy catch-all verbatim: a positive delta counts as
    /// `StockAdded` **only if** the day's bucket has no inbound stock yet;
    /// everything else is dropped without trace.
    ///
    /// This makes classification depend on entry-processing order within a
    /// day. Whether that order-dependence was intentional upstream is an
    /// open question (see DESIGN.md); it is kept behind this named policy
    /// rather than silently fixed.
    #[default]
    Legacy,

    /// Route unmatched entries to the bucket's `unclassified` accumulator
    /// so the caller can see exactly what the rule table did not explain.
    Strict,
}

/// Outcome of classifying one ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Entry contributes `magnitude` to exactly one bucket field.
    Counted(MovementKind, i64),
    /// Legacy fallback declined the entry; it contributes nothing.
    Dropped,
    /// Strict fallback: entry is surfaced in the `unclassified` accumulator.
    Unclassified(i64),
}

// ---------------------------------------------------------------------------
// Full-reconciliation rule table
// ---------------------------------------------------------------------------

/// Classify one ledger entry for the full reconciliation.
///
/// Ordered rule list, first match wins:
/// 1. procurement reason and positive delta → `StockAdded`
/// 2. `"transfer out"` and negative delta → `TransferOut`
/// 3. customer-return reason and positive delta → `ReturnIn`
/// 4. supplier-return reason and negative delta → `ReturnOut`
/// 5. fallback per `policy` (the only rule that inspects `bucket_so_far`)
///
/// `ItemsSold` is never produced here: sold volume comes from the sales
/// table, which is authoritative even when the ledger mislabels a sale.
pub fn classify_entry(
    entry: &StockHistoryEntry,
    bucket_so_far: &DailyMovementBucket,
    policy: FallbackPolicy,
) -> Classification {
    let change = entry.quantity_change;
    let magnitude = change.abs();
    let tag = normalize_reason(entry.reason.as_deref());

    match tag {
        ReasonTag::Procurement if change > 0 => {
            return Classification::Counted(MovementKind::StockAdded, magnitude)
        }
        ReasonTag::TransferOut if change < 0 => {
            return Classification::Counted(MovementKind::TransferOut, magnitude)
        }
        ReasonTag::CustomerReturn if change > 0 => {
            return Classification::Counted(MovementKind::ReturnIn, magnitude)
        }
        ReasonTag::SupplierReturn if change < 0 => {
            return Classification::Counted(MovementKind::ReturnOut, magnitude)
        }
        _ => {}
    }

    match policy {
        FallbackPolicy::Legacy => {
            if change > 0 && !bucket_so_far.has_inbound() {
                Classification::Counted(MovementKind::StockAdded, magnitude)
            } else {
                Classification::Dropped
            }
        }
        FallbackPolicy::Strict => Classification::Unclassified(magnitude),
    }
}

// ---------------------------------------------------------------------------
// Period-variant rule table
// ---------------------------------------------------------------------------

/// Classify one ledger entry for the period summary.
///
/// The period variant trusts the coarse `movement_type` label first, then
/// falls back to reason tags, then to the delta sign. Total: every entry
/// lands in exactly one field.
///
/// `MovementKind::StockAdded` doubles as the period's `stock_in` field.
pub fn classify_period_entry(entry: &StockHistoryEntry) -> (MovementKind, i64) {
    let change = entry.quantity_change;
    let magnitude = change.abs();

    match entry.movement_type {
        MovementType::Sale => return (MovementKind::ItemsSold, magnitude),
        MovementType::Restock => return (MovementKind::StockAdded, magnitude),
        _ => {}
    }

    match normalize_reason(entry.reason.as_deref()) {
        ReasonTag::TransferOut if change < 0 => (MovementKind::TransferOut, magnitude),
        ReasonTag::CustomerReturn if change > 0 => (MovementKind::ReturnIn, magnitude),
        ReasonTag::SupplierReturn if change < 0 => (MovementKind::ReturnOut, magnitude),
        ReasonTag::Procurement if change > 0 => (MovementKind::StockAdded, magnitude),
        _ if change > 0 => (MovementKind::StockAdded, magnitude),
        _ => (MovementKind::ItemsSold, magnitude),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn entry(reason: Option<&str>, change: i64, movement_type: MovementType) -> StockHistoryEntry {
        StockHistoryEntry {
            product_id: Uuid::nil(),
            recorded_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            old_stock: None,
            new_stock: None,
            quantity_change: change,
            movement_type,
            reason: reason.map(str::to_string),
        }
    }

    fn empty() -> DailyMovementBucket {
        DailyMovementBucket::default()
    }

    // --- Reason normalization ---

    #[test]
    fn normalizes_exact_phrases_case_insensitively() {
        assert_eq!(normalize_reason(Some("Transfer Out")), ReasonTag::TransferOut);
        assert_eq!(
            normalize_reason(Some("  customer return ")),
            ReasonTag::CustomerReturn
        );
        assert_eq!(normalize_reason(Some("RETURN IN")), ReasonTag::CustomerReturn);
        assert_eq!(
            normalize_reason(Some("return to supplier")),
            ReasonTag::SupplierReturn
        );
        assert_eq!(normalize_reason(Some("return out")), ReasonTag::SupplierReturn);
    }

    #[test]
    fn procurement_substrings_match_anywhere() {
        assert_eq!(
            normalize_reason(Some("Purchase Invoice #1042")),
            ReasonTag::Procurement
        );
        assert_eq!(
            normalize_reason(Some("supplier delivery")),
            ReasonTag::Procurement
        );
        assert_eq!(
            normalize_reason(Some("restock session 7")),
            ReasonTag::Procurement
        );
    }

    #[test]
    fn exact_supplier_return_beats_procurement_substring() {
        // "return to supplier" contains "supplier" but must not be procurement.
        assert_eq!(
            normalize_reason(Some("Return To Supplier")),
            ReasonTag::SupplierReturn
        );
    }

    #[test]
    fn missing_or_unknown_reason_is_other() {
        assert_eq!(normalize_reason(None), ReasonTag::Other);
        assert_eq!(normalize_reason(Some("Stock Reconciliation")), ReasonTag::Other);
        assert_eq!(normalize_reason(Some("sale")), ReasonTag::Other);
    }

    // --- Full-reconciliation rules ---

    #[test]
    fn procurement_positive_is_stock_added() {
        let e = entry(Some("purchase order"), 25, MovementType::Restock);
        assert_eq!(
            classify_entry(&e, &empty(), FallbackPolicy::Legacy),
            Classification::Counted(MovementKind::StockAdded, 25)
        );
    }

    #[test]
    fn procurement_negative_falls_through() {
        // A negative "supplier" entry matches no explicit rule; legacy drops it.
        let e = entry(Some("supplier adjustment"), -5, MovementType::Adjustment);
        assert_eq!(
            classify_entry(&e, &empty(), FallbackPolicy::Legacy),
            Classification::Dropped
        );
    }

    #[test]
    fn transfer_out_requires_negative_delta() {
        let e = entry(Some("transfer out"), -7, MovementType::Transfer);
        assert_eq!(
            classify_entry(&e, &empty(), FallbackPolicy::Legacy),
            Classification::Counted(MovementKind::TransferOut, 7)
        );
    }

    #[test]
    fn customer_return_positive_is_return_in() {
        let e = entry(Some("customer return"), 3, MovementType::Return);
        assert_eq!(
            classify_entry(&e, &empty(), FallbackPolicy::Legacy),
            Classification::Counted(MovementKind::ReturnIn, 3)
        );
    }

    #[test]
    fn supplier_return_negative_is_return_out() {
        let e = entry(Some("return to supplier"), -4, MovementType::Return);
        assert_eq!(
            classify_entry(&e, &empty(), FallbackPolicy::Legacy),
            Classification::Counted(MovementKind::ReturnOut, 4)
        );
    }

    // --- Legacy fallback order-dependence ---

    #[test]
    fn legacy_fallback_counts_first_positive_unknown() {
        let e = entry(Some("Initial stock"), 100, MovementType::Restock);
        assert_eq!(
            classify_entry(&e, &empty(), FallbackPolicy::Legacy),
            Classification::Counted(MovementKind::StockAdded, 100)
        );
    }

    #[test]
    fn legacy_fallback_drops_positive_unknown_after_inbound() {
        let mut bucket = empty();
        bucket.stock_added = 50;
        let e = entry(Some("manual correction"), 10, MovementType::Adjustment);
        assert_eq!(
            classify_entry(&e, &bucket, FallbackPolicy::Legacy),
            Classification::Dropped
        );
    }

    #[test]
    fn legacy_fallback_drops_negative_unknown() {
        let e = entry(Some("sale"), -10, MovementType::Sale);
        assert_eq!(
            classify_entry(&e, &empty(), FallbackPolicy::Legacy),
            Classification::Dropped
        );
    }

    #[test]
    fn strict_fallback_surfaces_unmatched_entries() {
        let e = entry(Some("manual correction"), -10, MovementType::Adjustment);
        assert_eq!(
            classify_entry(&e, &empty(), FallbackPolicy::Strict),
            Classification::Unclassified(10)
        );
    }

    // --- Period-variant rules ---

    #[test]
    fn period_trusts_sale_label_first() {
        // Reason says nothing; the SALE label wins.
        let e = entry(None, -10, MovementType::Sale);
        assert_eq!(classify_period_entry(&e), (MovementKind::ItemsSold, 10));
    }

    #[test]
    fn period_trusts_restock_label_first() {
        let e = entry(Some("whatever"), 40, MovementType::Restock);
        assert_eq!(classify_period_entry(&e), (MovementKind::StockAdded, 40));
    }

    #[test]
    fn period_falls_back_to_reason_tags() {
        let e = entry(Some("transfer out"), -6, MovementType::Transfer);
        assert_eq!(classify_period_entry(&e), (MovementKind::TransferOut, 6));
        let e = entry(Some("return in"), 2, MovementType::Return);
        assert_eq!(classify_period_entry(&e), (MovementKind::ReturnIn, 2));
    }

    #[test]
    fn period_catch_all_uses_delta_sign() {
        let e = entry(Some("mystery"), 9, MovementType::Other);
        assert_eq!(classify_period_entry(&e), (MovementKind::StockAdded, 9));
        let e = entry(Some("mystery"), -9, MovementType::Other);
        assert_eq!(classify_period_entry(&e), (MovementKind::ItemsSold, 9));
    }
}
