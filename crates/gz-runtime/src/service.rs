//! `LedgerService` — feed + engine wiring.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gz_reconcile::{
    period_summary, reconcile, EngineConfig, PeriodSummaryRow, PeriodWindow, ReconciliationResult,
};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{error::ServiceError, feed::LedgerFeed};

/// Fan-out cap for the store-wide period report when the env var is unset.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Env var overriding the catalog fan-out cap.
pub const ENV_MAX_CONCURRENCY: &str = "GONZA_REPORT_MAX_CONCURRENCY";

/// Service configuration: engine knobs plus the catalog fan-out cap.
#[derive(Clone, Copy, Debug)]
pub struct ServiceConfig {
    pub engine: EngineConfig,
    /// Upper bound on concurrently running per-product period summaries.
    /// The legacy report spawned one unbounded task per product; a
    /// large catalog would overwhelm the persistence layer, so the fan-out
    /// is semaphore-gated here.
    pub max_concurrency: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl ServiceConfig {
    /// Default config with `GONZA_REPORT_MAX_CONCURRENCY` applied if set and
    /// parseable; zero is rejected (a zero-permit semaphore never progresses).
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(raw) = std::env::var(ENV_MAX_CONCURRENCY) {
            match raw.parse::<usize>() {
                Ok(n) if n > 0 => cfg.max_concurrency = n,
                _ => warn!(value = %raw, "ignoring invalid {ENV_MAX_CONCURRENCY}"),
            }
        }
        cfg
    }
}

/// Read-only reconciliation service over a [`LedgerFeed`].
///
/// Cheap to clone; all state is the shared feed handle and the config.
/// No transaction boundary is taken beyond the individual read queries: a
/// concurrent sale landing between the history fetch and the live-stock
/// read can produce a spurious discrepancy, which is accepted by design —
/// surfacing exactly that class of drift is what the engine is for.
#[derive(Clone)]
pub struct LedgerService {
    feed: Arc<dyn LedgerFeed>,
    config: ServiceConfig,
}

impl LedgerService {
    pub fn new(feed: Arc<dyn LedgerFeed>, config: ServiceConfig) -> Self {
        Self { feed, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Full reconciliation for one product.
    ///
    /// The history and sales fetches are issued concurrently; the engine run
    /// itself is synchronous and pure.
    pub async fn reconcile(&self, product_id: Uuid) -> Result<ReconciliationResult, ServiceError> {
        let product = self
            .feed
            .product(product_id)
            .await?
            .ok_or(ServiceError::ProductNotFound { product_id })?;

        let (entries, sales) =
            tokio::try_join!(self.feed.history(product_id), self.feed.sale_lines(product_id))?;

        let result = reconcile(&product, &entries, &sales, self.config.engine);
        if !result.is_clean() {
            debug!(
                product_id = %product_id,
                discrepancy = result.discrepancy,
                "ledger does not explain live counter"
            );
        }
        Ok(result)
    }

    /// Period summary for one product over a half-open `[from, to)` window.
    pub async fn period_summary(
        &self,
        product_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<PeriodSummaryRow, ServiceError> {
        let product = self
            .feed
            .product(product_id)
            .await?
            .ok_or(ServiceError::ProductNotFound { product_id })?;

        let (entries, opening_entry) = tokio::try_join!(
            self.feed.history_window(product_id, from, to),
            self.feed.last_entry_before(product_id, from)
        )?;

        Ok(period_summary(
            &product,
            PeriodWindow::new(from, to),
            opening_entry.as_ref(),
            &entries,
        ))
    }

    /// Store-wide period report: one summary per catalog product.
    ///
    /// Per-product computations are independent; the fan-out is bounded by
    /// `config.max_concurrency` permits. Rows come back sorted by product id
    /// so repeated runs over an unchanged catalog produce identical output.
    /// The first per-product failure aborts the report.
    pub async fn catalog_period_report(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PeriodSummaryRow>, ServiceError> {
        let ids = self.feed.product_ids().await?;
        info!(
            products = ids.len(),
            max_concurrency = self.config.max_concurrency,
            "catalog period report started"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut handles = Vec::with_capacity(ids.len());
        for product_id in ids {
            let service = self.clone();
            let semaphore = Arc::clone(&semaphore);
            handles.push(tokio::spawn(async move {
                // Closed only if the semaphore is dropped, which cannot
                // happen while this task holds a clone.
                let _permit = semaphore.acquire().await.map_err(|e| {
                    ServiceError::storage(anyhow::anyhow!("semaphore closed: {e}"))
                })?;
                service.period_summary(product_id, from, to).await
            }));
        }

        let mut rows = Vec::with_capacity(handles.len());
        for handle in handles {
            let row = handle
                .await
                .map_err(|e| ServiceError::storage(anyhow::anyhow!("report task panicked: {e}")))??;
            rows.push(row);
        }

        rows.sort_by_key(|r| r.product_id);
        info!(rows = rows.len(), "catalog period report finished");
        Ok(rows)
    }
}
