//! Metrics collection and exposition.
//!
//! # Metrics
//! - `explorer_requests_total` (counter): requests by route, method, status
//! - `explorer_request_duration_seconds` (histogram): boundary latency
//! - `explorer_provider_calls_total` (counter): provider calls by network, method, outcome
//! - `explorer_provider_call_duration_seconds` (histogram): provider latency
//! - `explorer_transfer_stage_total` (counter): send pipeline stage transitions

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one request handled at the HTTP boundary.
pub fn record_request(route: &str, method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    counter!(
        "explorer_requests_total",
        "route" => route.to_string(),
        "method" => method.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        "explorer_request_duration_seconds",
        "route" => route.to_string(),
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one call issued against the chain-data provider.
pub fn record_provider_call(network: &'static str, method: &'static str, ok: bool, start: Instant) {
    let outcome = if ok { "ok" } else { "error" };
    counter!(
        "explorer_provider_calls_total",
        "network" => network,
        "method" => method,
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "explorer_provider_call_duration_seconds",
        "network" => network,
        "method" => method
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a send pipeline stage transition.
pub fn record_transfer_stage(network: &'static str, stage: &'static str) {
    counter!("explorer_transfer_stage_total", "network" => network, "stage" => stage).increment(1);
}
