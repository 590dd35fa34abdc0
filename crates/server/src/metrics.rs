//! Prometheus metrics for the folio server.
//!
//! Counters cover the file lifecycle (uploads, deletes, orphaned blobs) and
//! account activity (sessions issued, failed logins). No metric carries a
//! username, file name or token.
//!
//! The `/metrics` endpoint is unauthenticated; restrict it at the network
//! level when the server is reachable from untrusted hosts.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    self, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// File lifecycle
pub static PAPERS_UPLOADED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "folio_papers_uploaded_total",
        "Total number of files uploaded and recorded",
    )
    .expect("metric creation failed")
});

pub static PAPERS_DELETED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "folio_papers_deleted_total",
        "Total number of file records deleted",
    )
    .expect("metric creation failed")
});

pub static BYTES_UPLOADED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "folio_bytes_uploaded_total",
        "Total bytes written to the blob store by uploads",
    )
    .expect("metric creation failed")
});

pub static UPLOAD_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "folio_upload_duration_seconds",
            "Time taken to store a file and insert its record",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
    )
    .expect("metric creation failed")
});

pub static ORPHAN_BLOBS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "folio_orphan_blobs_total",
            "Blobs left on disk without a record, by cause",
        ),
        &["cause"],
    )
    .expect("metric creation failed")
});

// Accounts
pub static SESSIONS_CREATED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "folio_sessions_created_total",
        "Total number of login sessions issued",
    )
    .expect("metric creation failed")
});

pub static LOGIN_FAILURES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "folio_login_failures_total",
        "Total number of rejected login attempts",
    )
    .expect("metric creation failed")
});

static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent, so tests can build many routers in one process.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(PAPERS_UPLOADED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(PAPERS_DELETED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(BYTES_UPLOADED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPLOAD_DURATION.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ORPHAN_BLOBS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(SESSIONS_CREATED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(LOGIN_FAILURES.clone()))
            .expect("metric registration failed");
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Record a blob left behind without a record.
pub fn record_orphan_blob(cause: &str) {
    ORPHAN_BLOBS.with_label_values(&[cause]).inc();
}
