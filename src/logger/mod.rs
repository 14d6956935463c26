//! Logger module
//!
//! Operator-facing lifecycle lines are printed to stdout. Diagnostics and
//! the access log go through `tracing`, written to stderr.

mod format;

pub use format::AccessLogEntry;

use crate::config::LoggingConfig;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// The filter comes from configuration only; `RUST_LOG` is not consulted.
pub fn init(config: &LoggingConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init()
}

pub fn log_server_start(addr: &SocketAddr) {
    println!(
        "Starting server with SharedArrayBuffer support at http://localhost:{}",
        addr.port()
    );
    println!(
        "Required headers: Cross-Origin-Opener-Policy: same-origin, Cross-Origin-Embedder-Policy: require-corp"
    );
    tracing::debug!(%addr, "listener bound");
}

pub fn log_server_stopped() {
    println!("Server stopped");
}

pub fn log_startup_failed(err: &impl std::fmt::Display) {
    eprintln!("[ERROR] {err}");
}

pub fn log_shutdown_requested(signal: &str) {
    tracing::info!("{signal} received, shutting down");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    tracing::debug!("failed to serve connection: {err}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry) {
    tracing::info!(target: "access", "{entry}");
}
