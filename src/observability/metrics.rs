//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by endpoint, status
//! - `gateway_request_duration_seconds` (histogram): latency by endpoint
//! - `gateway_upstream_calls_total` (counter): provider calls by provider, outcome
//! - `gateway_provider_fallbacks_total` (counter): Gemini → gateway fallbacks
//! - `gateway_rate_limited_total` (counter): local rate-limit rejections
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter, so
//! tests and metrics-disabled deployments pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request to one of our endpoints.
pub fn record_request(endpoint: &'static str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of one call to an upstream provider.
pub fn record_upstream_call(provider: &'static str, outcome: &'static str) {
    counter!(
        "gateway_upstream_calls_total",
        "provider" => provider,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_fallback() {
    counter!("gateway_provider_fallbacks_total").increment(1);
}

pub fn record_rate_limited(reason: &'static str) {
    counter!("gateway_rate_limited_total", "reason" => reason).increment(1);
}
