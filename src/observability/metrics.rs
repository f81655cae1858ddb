//! Metrics collection and exposition.
//!
//! # Metrics
//! - `resp_proxy_commands_total` (counter): decoded requests by command
//! - `resp_proxy_decode_errors_total` (counter): protocol violations by kind
//! - `resp_proxy_backend_dial_failures_total` (counter)
//! - `resp_proxy_accept_errors_total` (counter)
//! - `resp_proxy_active_sessions` (gauge)
//! - `resp_proxy_bytes_relayed_total` (counter): by direction
//!
//! # Design Decisions
//! - Without an installed recorder every call here is a no-op
//! - Command labels come from the fixed command table, so cardinality is bounded

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Client → backend.
pub const INBOUND: &str = "inbound";
/// Backend → client.
pub const OUTBOUND: &str = "outbound";

/// Install the Prometheus recorder and its HTTP scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!("resp_proxy_commands_total", "Decoded client requests");
    describe_counter!("resp_proxy_decode_errors_total", "Protocol violations from clients");
    describe_counter!("resp_proxy_backend_dial_failures_total", "Failed backend dials");
    describe_counter!("resp_proxy_accept_errors_total", "Failed accepts on the listener");
    describe_gauge!("resp_proxy_active_sessions", "Sessions currently open");
    describe_counter!("resp_proxy_bytes_relayed_total", "Bytes written to the other leg");

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_command(label: &'static str) {
    counter!("resp_proxy_commands_total", "command" => label).increment(1);
}

pub fn record_decode_error(kind: &'static str) {
    counter!("resp_proxy_decode_errors_total", "kind" => kind).increment(1);
}

pub fn record_dial_failure() {
    counter!("resp_proxy_backend_dial_failures_total").increment(1);
}

pub fn record_accept_error() {
    counter!("resp_proxy_accept_errors_total").increment(1);
}

pub fn record_bytes_relayed(direction: &'static str, bytes: u64) {
    counter!("resp_proxy_bytes_relayed_total", "direction" => direction).increment(bytes);
}

pub fn session_opened() {
    gauge!("resp_proxy_active_sessions").increment(1.0);
}

pub fn session_closed() {
    gauge!("resp_proxy_active_sessions").decrement(1.0);
}
