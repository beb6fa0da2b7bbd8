//! Running-balance reconstruction over aggregated daily buckets.

use gz_schemas::StockHistoryEntry;

use crate::types::{DailyBreakdownRow, DailyBuckets};

/// Stock level *before* the chronologically first ledger entry.
///
/// `entries` must be in chronological order (the store returns them that
/// way). Prefers the first entry's `old_stock`; if absent, derives it from
/// `new_stock - quantity_change`; 0 when neither is recorded or the ledger
/// is empty.
pub fn opening_stock(entries: &[StockHistoryEntry]) -> i64 {
    let first = match entries.first() {
        Some(e) => e,
        None => return 0,
    };
    if let Some(old) = first.old_stock {
        return old;
    }
    if let Some(new) = first.new_stock {
        return new - first.quantity_change;
    }
    0
}

/// Walk buckets in ascending date order, carrying a running balance.
///
/// Each row's `ending_stock` is `starting_stock + bucket.net_change()`;
/// the next row opens where this one closed. Negative balances are emitted
/// as-is — they signal a data-quality problem and must not be corrected
/// here. Terminates in O(number of distinct days).
pub fn reconstruct(buckets: &DailyBuckets, opening_stock: i64) -> Vec<DailyBreakdownRow> {
    let mut rows = Vec::with_capacity(buckets.len());
    let mut running = opening_stock;

    for (date, bucket) in buckets {
        let starting = running;
        let ending = starting + bucket.net_change();
        rows.push(DailyBreakdownRow {
            date: *date,
            starting_stock: starting,
            items_sold: bucket.items_sold,
            stock_added: bucket.stock_added,
            transfer_out: bucket.transfer_out,
            return_in: bucket.return_in,
            return_out: bucket.return_out,
            ending_stock: ending,
        });
        running = ending;
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DailyMovementBucket;
    use chrono::{NaiveDate, TimeZone, Utc};
    use gz_schemas::MovementType;
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn bucket(sold: i64, added: i64) -> DailyMovementBucket {
        DailyMovementBucket {
            items_sold: sold,
            stock_added: added,
            ..Default::default()
        }
    }

    #[test]
    fn opening_stock_prefers_old_stock() {
        let e = StockHistoryEntry {
            product_id: Uuid::nil(),
            recorded_at: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            old_stock: Some(12),
            new_stock: Some(112),
            quantity_change: 100,
            movement_type: MovementType::Restock,
            reason: None,
        };
        assert_eq!(opening_stock(&[e]), 12);
    }

    #[test]
    fn opening_stock_derives_from_new_minus_change() {
        let e = StockHistoryEntry {
            product_id: Uuid::nil(),
            recorded_at: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            old_stock: None,
            new_stock: Some(100),
            quantity_change: 100,
            movement_type: MovementType::Restock,
            reason: None,
        };
        assert_eq!(opening_stock(&[e]), 0);
    }

    #[test]
    fn opening_stock_empty_ledger_is_zero() {
        assert_eq!(opening_stock(&[]), 0);
    }

    #[test]
    fn rows_chain_and_conserve() {
        let mut buckets = DailyBuckets::new();
        buckets.insert(day(1), bucket(0, 100));
        buckets.insert(day(2), bucket(10, 0));
        buckets.insert(day(3), bucket(25, 5));

        let rows = reconstruct(&buckets, 0);
        assert_eq!(rows.len(), 3);

        for w in rows.windows(2) {
            assert_eq!(w[1].starting_stock, w[0].ending_stock);
        }
        for r in &rows {
            assert_eq!(
                r.ending_stock - r.starting_stock,
                r.stock_added + r.return_in - r.items_sold - r.transfer_out - r.return_out
            );
        }
        assert_eq!(rows.last().unwrap().ending_stock, 70);
    }

    #[test]
    fn negative_balance_is_emitted_not_clamped() {
        let mut buckets = DailyBuckets::new();
        buckets.insert(day(1), bucket(40, 0));

        let rows = reconstruct(&buckets, 10);
        assert_eq!(rows[0].ending_stock, -30);
    }

    #[test]
    fn empty_buckets_produce_no_rows() {
        assert!(reconstruct(&DailyBuckets::new(), 50).is_empty());
    }
}
