//! gz-runtime
//!
//! Orchestration over the pure reconciliation engine:
//! - `LedgerFeed` is the persistence seam (Postgres in gz-store, in-memory
//!   in gz-testkit)
//! - `LedgerService` wires feed + engine: concurrent fetches per product,
//!   bounded fan-out across the catalog
//! - `ServiceError` is the tagged failure taxonomy; integrity anomalies
//!   (drift, negative balances) are result data and never abort

mod error;
mod feed;
mod service;

pub use error::ServiceError;
pub use feed::LedgerFeed;
pub use service::{LedgerService, ServiceConfig, DEFAULT_MAX_CONCURRENCY};
