use std::sync::Arc;

use chrono::{TimeZone, Utc};
use gz_runtime::{LedgerService, ServiceConfig};
use gz_schemas::{MovementType, ProductRecord, SaleLineItem};
use gz_testkit::MemoryLedgerFeed;
use uuid::Uuid;

#[tokio::test]
async fn scenario_service_reconcile_end_to_end() {
    let pid = Uuid::new_v4();
    let mut feed = MemoryLedgerFeed::new();
    feed.insert_product(ProductRecord {
        product_id: pid,
        name: "Widget".to_string(),
        current_stock: 85,
        cost_price_micros: 1_000_000,
    });
    feed.push_movement(
        pid,
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        0,
        100,
        MovementType::Restock,
        "Initial stock",
    );
    feed.push_movement(
        pid,
        Utc.with_ymd_and_hms(2025, 3, 2, 14, 0, 0).unwrap(),
        100,
        90,
        MovementType::Sale,
        "sale",
    );
    feed.push_sale(SaleLineItem {
        product_id: pid,
        sold_at: Utc.with_ymd_and_hms(2025, 3, 2, 14, 0, 0).unwrap(),
        quantity_sold: 10,
    });

    let service = LedgerService::new(Arc::new(feed), ServiceConfig::default());
    let r = service.reconcile(pid).await.expect("reconcile");

    assert_eq!(r.opening_stock, 0);
    assert_eq!(r.calculated_closing_stock, 90);
    // Live counter says 85: five units of unexplained loss.
    assert_eq!(r.discrepancy, -5);
    assert_eq!(r.daily_breakdown.len(), 2);
}

#[tokio::test]
async fn scenario_service_period_summary_end_to_end() {
    let pid = Uuid::new_v4();
    let mut feed = MemoryLedgerFeed::new();
    feed.insert_product(ProductRecord {
        product_id: pid,
        name: "Widget".to_string(),
        current_stock: 90,
        cost_price_micros: 2_000_000,
    });
    feed.push_movement(
        pid,
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        0,
        100,
        MovementType::Restock,
        "Initial stock",
    );
    feed.push_movement(
        pid,
        Utc.with_ymd_and_hms(2025, 3, 2, 14, 0, 0).unwrap(),
        100,
        90,
        MovementType::Sale,
        "sale",
    );

    let service = LedgerService::new(Arc::new(feed), ServiceConfig::default());
    let row = service
        .period_summary(
            pid,
            Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap(),
        )
        .await
        .expect("period summary");

    assert_eq!(row.opening_stock, 100);
    assert_eq!(row.items_sold, 10);
    assert_eq!(row.closing_stock, 90);
    assert_eq!(row.revaluation_micros, 180_000_000);
}
