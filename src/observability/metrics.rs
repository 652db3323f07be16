//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define pipeline metrics (traffic, latency, rejections)
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `http_requests_received_total` (counter)
//! - `http_responses_sent_total` (counter)
//! - `http_processing_time_microseconds_total` (counter)
//! - `http_request_duration_seconds` (histogram): by method, status
//! - `rate_limit_rejections_total` (counter)
//! - `auth_failures_total` (counter): by reason
//! - `panics_recovered_total` (counter)
//! - `rate_limit_tracked_clients` (gauge)
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus metrics exporter started"),
        Err(e) => tracing::error!(error = %e, "Failed to install Prometheus recorder"),
    }
}

pub fn record_request_received() {
    counter!("http_requests_received_total").increment(1);
}

/// Record a finished request. `start` is when the request entered the pipeline.
pub fn record_response(method: &str, status: u16, start: Instant) {
    let elapsed = start.elapsed();

    counter!("http_responses_sent_total").increment(1);
    counter!("http_processing_time_microseconds_total")
        .increment(u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX));
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_rate_limited() {
    counter!("rate_limit_rejections_total").increment(1);
}

pub fn record_auth_failure(reason: &'static str) {
    counter!("auth_failures_total", "reason" => reason).increment(1);
}

pub fn record_panic_recovered() {
    counter!("panics_recovered_total").increment(1);
}

pub fn record_tracked_clients(count: usize) {
    gauge!("rate_limit_tracked_clients").set(count as f64);
}
