//! Logger module
//!
//! Provides logging utilities for the resource server including:
//! - Subscriber setup (text or JSON, filtered by level or `RUST_LOG`)
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LogFormat, LoggingConfig};
use hyper::{Method, Uri, Version};
use std::net::SocketAddr;
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid log level '{directive}': {source}")]
    Filter {
        directive: String,
        #[source]
        source: ParseError,
    },

    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Initialize the global subscriber
///
/// Should be called once at application startup. `RUST_LOG`, when set,
/// takes precedence over `logging.level`.
pub fn init(config: &LoggingConfig) -> Result<(), LoggerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|source| LoggerError::Filter {
            directive: config.level.clone(),
            source,
        })?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.format {
        LogFormat::Text => builder.with_target(false).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| LoggerError::Install(e.to_string()))
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, store: &str) {
    tracing::info!("======================================");
    tracing::info!("Webjars server started successfully");
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if config.webjars.context_path.is_empty() {
        tracing::info!("Context path: (root)");
    } else {
        tracing::info!("Context path: {}", config.webjars.context_path);
    }
    tracing::info!("Resource root: {}", config.webjars.resource_root);
    tracing::info!("Resources: {store}");
    tracing::info!("Cache TTL: {}s", config.webjars.cache_ttl_secs);
    tracing::info!("======================================");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_request(method: &Method, uri: &Uri, version: Version) {
    tracing::debug!("[Request] {method} {uri} {version:?}");
}

/// One event per handled request, naming the resolved key
pub fn log_resource_requested(method: &Method, key: &str) {
    tracing::info!(%method, key, "Webjars resource requested");
}

pub fn log_not_found(key: &str) {
    tracing::debug!(key, "Webjars resource not found");
}

pub fn log_response(size: u64) {
    tracing::debug!("[Response] Sent {size} bytes");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_shutdown_requested(active: usize) {
    tracing::info!("Shutdown requested, waiting for {active} active connection(s)");
}

pub fn log_shutdown_complete() {
    tracing::info!("Server stopped");
}
