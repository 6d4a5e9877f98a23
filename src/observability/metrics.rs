//! Metrics collection and exposition.
//!
//! # Metrics
//! - `admission_requests_total` (counter): requests by method and status
//! - `admission_request_duration_seconds` (histogram): latency
//! - `origin_rejections_total` (counter): requests stopped at the gate
//! - `sessions_created_total` / `sessions_resumed_total` (counters)
//!
//! Updates are cheap atomic operations; exposition runs on its own
//! listener so a scrape never competes with request traffic.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics endpoint ready"),
        Err(e) => tracing::error!(error = %e, "failed to install Prometheus exporter"),
    }
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "admission_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    metrics::histogram!(
        "admission_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_origin_rejection() {
    metrics::counter!("origin_rejections_total").increment(1);
}

pub fn record_session_created() {
    metrics::counter!("sessions_created_total").increment(1);
}

pub fn record_session_resumed() {
    metrics::counter!("sessions_resumed_total").increment(1);
}
