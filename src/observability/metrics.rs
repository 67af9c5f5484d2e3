//! Metrics collection and exposition.
//!
//! # Metrics
//! - `routekit_requests_total` (counter): requests by controller, handler, status
//! - `routekit_request_duration_seconds` (histogram): handler latency
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; no-ops until a recorder is installed
//! - Prometheus exporter is opt-in (see `ObservabilityConfig::metrics_enabled`)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Record one finished request.
pub fn record_request(controller: &str, handler: &str, status: u16, start: Instant) {
    let labels = [
        ("controller", controller.to_string()),
        ("handler", handler.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("routekit_requests_total", &labels).increment(1);
    metrics::histogram!("routekit_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}
