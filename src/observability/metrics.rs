//! Metrics collection and exposition.
//!
//! # Metrics
//! - `obs_requests_total` (counter): requests by handler, status
//! - `obs_request_duration_seconds` (histogram): latency distribution by handler
//! - `obs_faults_injected_total` (counter): induced faults by kind (latency, error)
//! - `obs_upstream_requests_total` (counter): proxy hops by outcome
//! - `obs_fault_latency_ms`, `obs_fault_error_percent` (gauges): live fault settings

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::faults::FaultSettings;

/// Install the Prometheus recorder with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(handler: &'static str, status: u16, start: Instant) {
    counter!("obs_requests_total", "handler" => handler, "status" => status.to_string())
        .increment(1);
    histogram!("obs_request_duration_seconds", "handler" => handler)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_fault(kind: &'static str) {
    counter!("obs_faults_injected_total", "kind" => kind).increment(1);
}

pub fn record_upstream(outcome: &'static str) {
    counter!("obs_upstream_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_fault_settings(settings: &FaultSettings) {
    gauge!("obs_fault_latency_ms").set(settings.latency_ms as f64);
    gauge!("obs_fault_error_percent").set(settings.error_percent as f64);
}
