//! Daily aggregation: bucketing classified movements by calendar day.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use gz_schemas::{SaleLineItem, StockHistoryEntry};
use serde::{Deserialize, Serialize};

use crate::classify::{classify_entry, Classification, FallbackPolicy};
use crate::types::{DailyBuckets, MovementKind};

// ---------------------------------------------------------------------------
// Day boundary
// ---------------------------------------------------------------------------

/// How a timestamp is truncated to a calendar day.
///
/// Legacy behavior truncated timestamps without timezone awareness;
/// [`DayBoundary::Utc`] preserves that (as UTC truncation) and is the
/// default. [`DayBoundary::Tz`] buckets by a store-local timezone for
/// deployments that care about midnight-straddling movements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayBoundary {
    #[default]
    Utc,
    Tz(Tz),
}

impl DayBoundary {
    /// Calendar day the timestamp falls on under this boundary.
    pub fn date_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        match self {
            DayBoundary::Utc => ts.date_naive(),
            DayBoundary::Tz(tz) => ts.with_timezone(tz).date_naive(),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Bucket sale line items and classified ledger entries by calendar day.
///
/// Sales are folded first so `items_sold` is settled before any ledger entry
/// consults the bucket (the legacy fallback rule reads bucket state).
/// Buckets are created lazily with all fields zeroed: a day with only sales,
/// or only ledger entries, still produces a bucket.
///
/// Every entry contributes to exactly one bucket field exactly once, or is
/// dropped / counted as unclassified per `policy`.
pub fn aggregate_daily(
    entries: &[StockHistoryEntry],
    sales: &[SaleLineItem],
    day_boundary: DayBoundary,
    policy: FallbackPolicy,
) -> DailyBuckets {
    let mut buckets = DailyBuckets::new();

    for sale in sales {
        let day = day_boundary.date_of(sale.sold_at);
        buckets
            .entry(day)
            .or_default()
            .add(MovementKind::ItemsSold, sale.quantity_sold);
    }

    for entry in entries {
        let day = day_boundary.date_of(entry.recorded_at);
        let bucket = buckets.entry(day).or_default();
        match classify_entry(entry, bucket, policy) {
            Classification::Counted(kind, magnitude) => bucket.add(kind, magnitude),
            Classification::Dropped => {}
            Classification::Unclassified(magnitude) => bucket.unclassified += magnitude,
        }
    }

    buckets
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
