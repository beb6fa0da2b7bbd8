use chrono::{TimeZone, Utc};
use gz_reconcile::{reconcile, EngineConfig};
use gz_schemas::{MovementType, ProductRecord, SaleLineItem, StockHistoryEntry};
use uuid::Uuid;

/// Live counter says 85, the ledger explains 90: a signed loss of 5 that the
/// ledger does not account for. The engine reports it and still completes.
#[test]
fn scenario_unexplained_loss_shows_negative_discrepancy() {
    let pid = Uuid::new_v4();
    let product = ProductRecord {
        product_id: pid,
        name: "Widget".to_string(),
        current_stock: 85,
        cost_price_micros: 1_000_000,
    };
    let entries = vec![
        StockHistoryEntry {
            product_id: pid,
            recorded_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
            old_stock: Some(0),
            new_stock: Some(100),
            quantity_change: 100,
            movement_type: MovementType::Restock,
            reason: Some("Initial stock".to_string()),
        },
        StockHistoryEntry {
            product_id: pid,
            recorded_at: Utc.with_ymd_and_hms(2025, 3, 2, 14, 0, 0).unwrap(),
            old_stock: Some(100),
            new_stock: Some(90),
            quantity_change: -10,
            movement_type: MovementType::Sale,
            reason: Some("sale".to_string()),
        },
    ];
    let sales = vec![SaleLineItem {
        product_id: pid,
        sold_at: Utc.with_ymd_and_hms(2025, 3, 2, 14, 0, 0).unwrap(),
        quantity_sold: 10,
    }];

    let r = reconcile(&product, &entries, &sales, EngineConfig::default());
    assert_eq!(r.calculated_closing_stock, 90);
    assert_eq!(r.discrepancy, -5);
    assert!(!r.is_clean());
}
