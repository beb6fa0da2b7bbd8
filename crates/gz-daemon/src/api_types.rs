//! Request and response types for all gz-daemon HTTP endpoints.
//!
//! These types are `Serialize + Deserialize` so they can be JSON-encoded
//! by Axum and decoded by tests. No business logic lives here.

use chrono::{DateTime, Utc};
use gz_reconcile::PeriodSummaryRow;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Body for 400/500 responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body for 404 responses on product-scoped routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotFoundResponse {
    pub error: String,
    pub product_id: Uuid,
}

// ---------------------------------------------------------------------------
// Window query parameters
// ---------------------------------------------------------------------------

/// `?from=...&to=...` — RFC 3339 timestamps, half-open `[from, to)`.
#[derive(Debug, Clone, Deserialize)]
pub struct WindowParams {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// /v1/reports/period-summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodReportResponse {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub row_count: usize,
    pub rows: Vec<PeriodSummaryRow>,
}
