//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Subscriber setup (text or JSON output, `RUST_LOG` aware)
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use std::net::SocketAddr;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Config, LogFormat};
use crate::error::ServerError;

/// Target used for per-request access lines
pub const ACCESS_TARGET: &str = "access";

/// Install the global tracing subscriber
///
/// Should be called once at application startup. `RUST_LOG` takes precedence
/// over `logging.level`.
pub fn init(config: &Config) -> Result<(), ServerError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .map_err(|e| {
            ServerError::Logger(format!("invalid log level '{}': {e}", config.logging.level))
        })?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.logging.format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };

    result.map_err(|e| ServerError::Logger(e.to_string()))
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, hostname: &str) {
    tracing::info!("======================================");
    tracing::info!("{} v{} started", config.app.name, config.app.version);
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Environment: {}", config.app.environment);
    tracing::info!("Hostname: {hostname}");
    match config.server.workers {
        Some(workers) => tracing::info!("Worker threads: {workers}"),
        None => tracing::info!("Worker threads: default (CPU cores)"),
    }
    if config.static_files.enabled {
        tracing::info!("Static files: {}/", config.static_files.dir);
    }
    tracing::info!("Available routes:");
    for route in &crate::handler::ROUTES {
        tracing::info!("  {} {} - {}", route.method, route.path, route.description);
    }
    tracing::info!("======================================");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(%peer_addr, "connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::warn!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log a route handler failure; the detail never reaches the client
pub fn log_handler_failure(method: &str, path: &str, detail: &str) {
    tracing::error!(method, path, "handler failed: {detail}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}

pub fn log_shutdown(active_connections: usize) {
    tracing::info!("Shutdown requested, {active_connections} connection(s) still open");
}
