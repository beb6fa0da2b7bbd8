//! Period summary variant: opening stock at a window boundary plus net
//! movement inside the window, valued at last-known unit cost.

use chrono::{DateTime, Utc};
use gz_schemas::{ProductRecord, StockHistoryEntry};
use serde::{Deserialize, Serialize};

use crate::classify::classify_period_entry;
use crate::types::{MovementKind, PeriodSummaryRow};

/// Half-open reporting window `[from, to)` on `recorded_at`.
///
/// The legacy reporting code mixed an exclusive lower bound (opening stock)
/// with an inclusive upper bound (classification); this engine standardizes
/// on half-open everywhere. The deviation is recorded in DESIGN.md.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl PeriodWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from <= ts && ts < self.to
    }
}

/// Summarize one product's movement inside `window`.
///
/// - `opening_entry` is the most recent ledger entry strictly before
///   `window.from`; opening stock is its `new_stock` (0 if none, or if the
///   entry never recorded a level — a simplification, not a true audit).
/// - `entries` are classified through the period rule table; anything
///   outside the window is ignored, so callers may pass an unfiltered slice.
/// - `revaluation_micros = closing_stock * cost_price_micros`.
pub fn period_summary(
    product: &ProductRecord,
    window: PeriodWindow,
    opening_entry: Option<&StockHistoryEntry>,
    entries: &[StockHistoryEntry],
) -> PeriodSummaryRow {
    let opening_stock = opening_entry.and_then(|e| e.new_stock).unwrap_or(0);

    let mut stock_in = 0i64;
    let mut items_sold = 0i64;
    let mut transfer_out = 0i64;
    let mut return_in = 0i64;
    let mut return_out = 0i64;

    for entry in entries.iter().filter(|e| window.contains(e.recorded_at)) {
        let (kind, magnitude) = classify_period_entry(entry);
        match kind {
            MovementKind::StockAdded => stock_in += magnitude,
            MovementKind::ItemsSold => items_sold += magnitude,
            MovementKind::TransferOut => transfer_out += magnitude,
            MovementKind::ReturnIn => return_in += magnitude,
            MovementKind::ReturnOut => return_out += magnitude,
        }
    }

    let closing_stock =
        opening_stock + stock_in + return_in - items_sold - transfer_out - return_out;

    PeriodSummaryRow {
        product_id: product.product_id,
        product_name: product.name.clone(),
        opening_stock,
        stock_in,
        items_sold,
        transfer_out,
        return_in,
        return_out,
        closing_stock,
        revaluation_micros: closing_stock * product.cost_price_micros,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gz_schemas::MovementType;
    use uuid::Uuid;

    fn product() -> ProductRecord {
        ProductRecord {
            product_id: Uuid::nil(),
            name: "Widget".to_string(),
            current_stock: 90,
            cost_price_micros: 1_500_000,
        }
    }

    fn entry(ts: DateTime<Utc>, change: i64, mt: MovementType, new_stock: Option<i64>) -> StockHistoryEntry {
        StockHistoryEntry {
            product_id: Uuid::nil(),
            recorded_at: ts,
            old_stock: None,
            new_stock,
            quantity_change: change,
            movement_type: mt,
            reason: None,
        }
    }

    #[test]
    fn window_is_half_open() {
        let from = Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
        let w = PeriodWindow::new(from, to);
        assert!(w.contains(from));
        assert!(!w.contains(to));
    }

    #[test]
    fn entries_outside_window_are_ignored() {
        let w = PeriodWindow::new(
            Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap(),
        );
        let entries = vec![
            entry(
                Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
                100,
                MovementType::Restock,
                Some(100),
            ),
            entry(
                Utc.with_ymd_and_hms(2025, 3, 2, 12, 0, 0).unwrap(),
                -10,
                MovementType::Sale,
                Some(90),
            ),
        ];
        let row = period_summary(&product(), w, None, &entries);
        assert_eq!(row.stock_in, 0);
        assert_eq!(row.items_sold, 10);
    }

    #[test]
    fn revaluation_uses_unit_cost_micros() {
        let w = PeriodWindow::new(
            Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap(),
        );
        let boundary = entry(
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            100,
            MovementType::Restock,
            Some(100),
        );
        let row = period_summary(&product(), w, Some(&boundary), &[]);
        assert_eq!(row.opening_stock, 100);
        assert_eq!(row.closing_stock, 100);
        assert_eq!(row.revaluation_micros, 150_000_000);
    }

    #[test]
    fn boundary_entry_without_level_opens_at_zero() {
        let w = PeriodWindow::new(
            Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap(),
        );
        let boundary = entry(
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            100,
            MovementType::Restock,
            None,
        );
        let row = period_summary(&product(), w, Some(&boundary), &[]);
        assert_eq!(row.opening_stock, 0);
    }
}
