use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Micros scale (1e-6) used for unit costs and revaluation amounts.
pub const MICROS_SCALE: i64 = 1_000_000;

/// Coarse movement label recorded at write time.
///
/// This is a *hint* from the writing side, not authoritative: the full
/// reconciliation classifies on `reason` + delta sign, and only the period
/// summary uses this label as a primary signal. Unknown labels therefore
/// parse to [`MovementType::Other`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    Restock,
    Sale,
    Adjustment,
    Transfer,
    Return,
    Other,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Restock => "RESTOCK",
            MovementType::Sale => "SALE",
            MovementType::Adjustment => "ADJUSTMENT",
            MovementType::Transfer => "TRANSFER",
            MovementType::Return => "RETURN",
            MovementType::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "RESTOCK" => MovementType::Restock,
            "SALE" => MovementType::Sale,
            "ADJUSTMENT" => MovementType::Adjustment,
            "TRANSFER" => MovementType::Transfer,
            "RETURN" => MovementType::Return,
            _ => MovementType::Other,
        }
    }
}

/// One append-only stock-history ledger record.
///
/// `quantity_change` is the authoritative delta — conventionally
/// `new_stock - old_stock`, but some records omit the before/after levels,
/// so the delta must be used as given and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockHistoryEntry {
    pub product_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub old_stock: Option<i64>,
    pub new_stock: Option<i64>,
    pub quantity_change: i64,
    pub movement_type: MovementType,
    pub reason: Option<String>,
}

/// One sale line item, carrying the parent sale's timestamp.
///
/// Authoritative source of sold volume: the ledger may mislabel sales, the
/// sales table does not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLineItem {
    pub product_id: Uuid,
    pub sold_at: DateTime<Utc>,
    pub quantity_sold: i64,
}

/// Live product record — the counter the ledger is reconciled against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: Uuid,
    pub name: String,
    pub current_stock: i64,
    /// Last-known unit cost in micros (1e-6 currency units).
    pub cost_price_micros: i64,
}
