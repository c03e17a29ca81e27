//! Prometheus metrics and the probe server
//!
//! Serves `/metrics`, `/healthz` and `/readyz` on `METRICS_ADDR`.

use crate::error::ControllerError;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Reconcile and remote-operation metrics, shared by every watcher
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    reconciles: IntCounterVec,
    operations: IntCounterVec,
    duration: HistogramVec,
    ready: Arc<AtomicBool>,
}

impl Metrics {
    pub fn new() -> Result<Self, ControllerError> {
        let registry = Registry::new();

        let reconciles = IntCounterVec::new(
            Opts::new("gitlab_provider_reconcile_total", "Reconciles by kind and result"),
            &["kind", "result"],
        )?;
        let operations = IntCounterVec::new(
            Opts::new(
                "gitlab_provider_external_operations_total",
                "GitLab operations issued by the reconcile state machine",
            ),
            &["kind", "operation", "result"],
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "gitlab_provider_reconcile_duration_seconds",
                "Reconcile duration by kind",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["kind"],
        )?;

        registry.register(Box::new(reconciles.clone()))?;
        registry.register(Box::new(operations.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            registry,
            reconciles,
            operations,
            duration,
            ready: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Metrics getter
    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }

    /// Count a finished reconcile
    pub fn reconciled(&self, kind: &str, result: &str, elapsed: Duration) {
        self.reconciles.with_label_values(&[kind, result]).inc();
        self.duration
            .with_label_values(&[kind])
            .observe(elapsed.as_secs_f64());
    }

    /// Count an Observe/Create/Update/Delete issued against GitLab
    pub fn external_operation(&self, kind: &str, operation: &str, result: &str) {
        self.operations
            .with_label_values(&[kind, operation, result])
            .inc();
    }

    /// Mark every watcher as started
    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn render(&self) -> Result<String, ControllerError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| ControllerError::InvalidConfig(format!("metrics are not UTF-8: {}", e)))
    }
}

async fn metrics_handler(State(metrics): State<Metrics>) -> impl IntoResponse {
    match metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn ready_handler(State(metrics): State<Metrics>) -> impl IntoResponse {
    if metrics.is_ready() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "starting")
    }
}

/// Build the probe and metrics router
pub fn router(metrics: Metrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(ready_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(metrics)
}

/// Serve metrics and probes until the process exits
pub async fn serve(addr: SocketAddr, metrics: Metrics) -> Result<(), ControllerError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);
    axum::serve(listener, router(metrics)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_exported() {
        let metrics = Metrics::new().unwrap();
        metrics.reconciled("Project", "success", Duration::from_millis(120));
        metrics.external_operation("Project", "create", "success");

        let body = metrics.render().unwrap();
        assert!(body.contains("gitlab_provider_reconcile_total{kind=\"Project\",result=\"success\"} 1"));
        assert!(body.contains("gitlab_provider_external_operations_total"));
        assert!(body.contains("gitlab_provider_reconcile_duration_seconds_bucket"));
    }

    #[test]
    fn test_readiness_flag() {
        let metrics = Metrics::new().unwrap();
        assert!(!metrics.is_ready());
        metrics.clone().set_ready();
        assert!(metrics.is_ready());
    }
}
