//! Metrics collection and exposition.
//!
//! # Metrics
//! - `chefito_admission_decisions_total` (counter): decisions by route, outcome
//! - `chefito_admission_tracked_keys` (gauge): client windows held per route
//! - `chefito_admission_evictions_total` (counter): windows removed by sweeps

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::admission::Decision;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_admission(route: &str, decision: Decision) {
    ::metrics::counter!(
        "chefito_admission_decisions_total",
        "route" => route.to_string(),
        "outcome" => decision.as_str()
    )
    .increment(1);
}

pub fn record_tracked_keys(route: &str, keys: usize) {
    ::metrics::gauge!("chefito_admission_tracked_keys", "route" => route.to_string()).set(keys as f64);
}

pub fn record_evictions(route: &str, evicted: usize) {
    ::metrics::counter!("chefito_admission_evictions_total", "route" => route.to_string())
        .increment(evicted as u64);
}
