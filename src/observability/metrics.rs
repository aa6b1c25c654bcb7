//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pnp_exchanges_total` (counter): exchanges by method, status
//! - `pnp_exchange_duration_seconds` (histogram): time from payload to reply
//! - `pnp_decrypt_failures_total` (counter): frames rejected by the codec
//! - `pnp_decode_failures_total` (counter): malformed envelopes
//! - `pnp_active_connections` (gauge): current connection count

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed exchange.
pub fn record_exchange(method: &str, status: u16, start: Instant) {
    counter!(
        "pnp_exchanges_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("pnp_exchange_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_decrypt_failure() {
    counter!("pnp_decrypt_failures_total").increment(1);
}

pub fn record_decode_failure() {
    counter!("pnp_decode_failures_total").increment(1);
}

pub fn connection_opened() {
    gauge!("pnp_active_connections").increment(1.0);
}

pub fn connection_closed() {
    gauge!("pnp_active_connections").decrement(1.0);
}
