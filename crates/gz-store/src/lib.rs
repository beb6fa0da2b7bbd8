//! gz-store
//!
//! Postgres reads for the reconciliation engine. The engine owns no
//! persisted state — every query here is read-only except the embedded
//! migrations.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gz_schemas::{MovementType, ProductRecord, SaleLineItem, StockHistoryEntry};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

mod feed;

pub use feed::PgLedgerFeed;

pub const ENV_DB_URL: &str = "GONZA_DATABASE_URL";

/// Connect to Postgres using GONZA_DATABASE_URL.
pub async fn connect_from_env() -> Result<PgPool> {
    let url =
        std::env::var(ENV_DB_URL).with_context(|| format!("missing env var {ENV_DB_URL}"))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .context("failed to connect to Postgres")?;

    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_stock_history_table: bool,
}

/// Simple status query (connectivity + schema presence).
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;
    let ok = one == 1;

    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema='public' and table_name='stock_history'
        )
        "#,
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    Ok(DbStatus {
        ok,
        has_stock_history_table: exists,
    })
}

/// Live product record, `None` if absent.
pub async fn fetch_product(pool: &PgPool, product_id: Uuid) -> Result<Option<ProductRecord>> {
    let row = sqlx::query(
        r#"
        select product_id, name, current_stock, cost_price_micros
        from products
        where product_id = $1
        "#,
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await
    .context("fetch_product failed")?;

    row.map(|row| {
        Ok(ProductRecord {
            product_id: row.try_get("product_id")?,
            name: row.try_get("name")?,
            current_stock: row.try_get("current_stock")?,
            cost_price_micros: row.try_get("cost_price_micros")?,
        })
    })
    .transpose()
}

/// Every product id in the catalog, ordered for deterministic reports.
pub async fn list_product_ids(pool: &PgPool) -> Result<Vec<Uuid>> {
    let rows = sqlx::query("select product_id from products order by product_id")
        .fetch_all(pool)
        .await
        .context("list_product_ids failed")?;

    rows.iter()
        .map(|row| row.try_get("product_id").map_err(Into::into))
        .collect()
}

const HISTORY_COLUMNS: &str = r#"
    product_id,
    recorded_at,
    old_stock,
    new_stock,
    quantity_change,
    movement_type,
    reason
"#;

fn entry_from_row(row: &sqlx::postgres::PgRow) -> Result<StockHistoryEntry> {
    Ok(StockHistoryEntry {
        product_id: row.try_get("product_id")?,
        recorded_at: row.try_get("recorded_at")?,
        old_stock: row.try_get("old_stock")?,
        new_stock: row.try_get("new_stock")?,
        quantity_change: row.try_get("quantity_change")?,
        movement_type: MovementType::parse(&row.try_get::<String, _>("movement_type")?),
        reason: row.try_get("reason")?,
    })
}

/// Full chronological ledger for one product.
pub async fn fetch_history(pool: &PgPool, product_id: Uuid) -> Result<Vec<StockHistoryEntry>> {
    let rows = sqlx::query(&format!(
        r#"
        select {HISTORY_COLUMNS}
        from stock_history
        where product_id = $1
        order by recorded_at asc
        "#
    ))
    .bind(product_id)
    .fetch_all(pool)
    .await
    .context("fetch_history failed")?;

    rows.iter().map(entry_from_row).collect()
}

/// Ledger slice with `from <= recorded_at < to`.
pub async fn fetch_history_window(
    pool: &PgPool,
    product_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<StockHistoryEntry>> {
    let rows = sqlx::query(&format!(
        r#"
        select {HISTORY_COLUMNS}
        from stock_history
        where product_id = $1
          and recorded_at >= $2
          and recorded_at < $3
        order by recorded_at asc
        "#
    ))
    .bind(product_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
    .context("fetch_history_window failed")?;

    rows.iter().map(entry_from_row).collect()
}

/// Most recent ledger entry strictly before `at`.
pub async fn fetch_last_entry_before(
    pool: &PgPool,
    product_id: Uuid,
    at: DateTime<Utc>,
) -> Result<Option<StockHistoryEntry>> {
    let row = sqlx::query(&format!(
        r#"
        select {HISTORY_COLUMNS}
        from stock_history
        where product_id = $1
          and recorded_at < $2
        order by recorded_at desc
        limit 1
        "#
    ))
    .bind(product_id)
    .bind(at)
    .fetch_optional(pool)
    .await
    .context("fetch_last_entry_before failed")?;

    row.as_ref().map(entry_from_row).transpose()
}

/// All sale line items for a product, joined to the parent sale for its
/// timestamp. The sales table is the authoritative source of sold volume.
pub async fn fetch_sale_lines(pool: &PgPool, product_id: Uuid) -> Result<Vec<SaleLineItem>> {
    let rows = sqlx::query(
        r#"
        select si.product_id, s.sold_at, si.quantity_sold
        from sale_items si
        join sales s on s.sale_id = si.sale_id
        where si.product_id = $1
        order by s.sold_at asc
        "#,
    )
    .bind(product_id)
    .fetch_all(pool)
    .await
    .context("fetch_sale_lines failed")?;

    rows.iter()
        .map(|row| {
            Ok(SaleLineItem {
                product_id: row.try_get("product_id")?,
                sold_at: row.try_get("sold_at")?,
                quantity_sold: row.try_get("quantity_sold")?,
            })
        })
        .collect()
}
