//! Axum router and all HTTP handlers for gz-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. All handlers are `pub(crate)` so the scenario tests in
//! `tests/` can compose the router directly.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use gz_runtime::ServiceError;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    api_types::{
        ErrorResponse, HealthResponse, NotFoundResponse, PeriodReportResponse, WindowParams,
    },
    state::{AppState, BusMsg},
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/products/:id/reconciliation", get(product_reconciliation))
        .route("/v1/products/:id/period-summary", get(product_period_summary))
        .route("/v1/reports/period-summary", get(catalog_period_report))
        .route("/v1/stream", get(stream))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// `ProductNotFound` → 404 with the offending id; `Storage` → 500 with a
/// generic body (the cause goes to the log, not to the client).
fn service_error_response(err: ServiceError) -> Response {
    match err {
        ServiceError::ProductNotFound { product_id } => (
            StatusCode::NOT_FOUND,
            Json(NotFoundResponse {
                error: "product not found".to_string(),
                product_id,
            }),
        )
            .into_response(),
        ServiceError::Storage(cause) => {
            error!(error = %format!("{cause:#}"), "storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "storage error".to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn bad_window_response() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "window requires from < to".to_string(),
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/products/:id/reconciliation
// ---------------------------------------------------------------------------

pub(crate) async fn product_reconciliation(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Response {
    match st.service.reconcile(id).await {
        Ok(result) => {
            if !result.is_clean() {
                info!(product_id = %id, discrepancy = result.discrepancy, "reconciliation drift");
            }
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(err) => service_error_response(err),
    }
}

// ---------------------------------------------------------------------------
// GET /v1/products/:id/period-summary?from&to
// ---------------------------------------------------------------------------

pub(crate) async fn product_period_summary(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(window): Query<WindowParams>,
) -> Response {
    if window.from >= window.to {
        return bad_window_response();
    }
    match st.service.period_summary(id, window.from, window.to).await {
        Ok(row) => (StatusCode::OK, Json(row)).into_response(),
        Err(err) => service_error_response(err),
    }
}

// ---------------------------------------------------------------------------
// GET /v1/reports/period-summary?from&to
// ---------------------------------------------------------------------------

pub(crate) async fn catalog_period_report(
    State(st): State<Arc<AppState>>,
    Query(window): Query<WindowParams>,
) -> Response {
    if window.from >= window.to {
        return bad_window_response();
    }
    match st.service.catalog_period_report(window.from, window.to).await {
        Ok(rows) => {
            let _ = st.bus.send(BusMsg::ReportDone { rows: rows.len() });
            (
                StatusCode::OK,
                Json(PeriodReportResponse {
                    from: window.from,
                    to: window.to,
                    row_count: rows.len(),
                    rows,
                }),
            )
                .into_response()
        }
        Err(err) => service_error_response(err),
    }
}

// ---------------------------------------------------------------------------
// GET /v1/stream  (SSE)
// ---------------------------------------------------------------------------

pub(crate) async fn stream(State(st): State<Arc<AppState>>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));

    let rx = st.bus.subscribe();
    let events = broadcast_to_sse(rx);

    (headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}

fn broadcast_to_sse(
    rx: broadcast::Receiver<BusMsg>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(m) => {
                let event_name = match &m {
                    BusMsg::Heartbeat { .. } => "heartbeat",
                    BusMsg::LogLine { .. } => "log",
                    BusMsg::ReportDone { .. } => "report",
                };
                let data = serde_json::to_string(&m).ok()?;
                Some(Ok(Event::default().event(event_name).data(data)))
            }
            Err(_) => None, // lagged / closed
        }
    })
}
