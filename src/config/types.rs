// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub webjars: WebjarsConfig,
    pub resources: ResourcesConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG` when set
    pub level: String,
    pub format: LogFormat,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
}

/// Output format of the diagnostic log
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Resource resolution and caching
#[derive(Debug, Deserialize, Clone)]
pub struct WebjarsConfig {
    /// Mount point of the application, stripped from request paths
    pub context_path: String,
    /// Prefix prepended to form the resource key
    pub resource_root: String,
    /// Lifetime applied to every served resource
    pub cache_ttl_secs: u64,
    /// Size of the copy buffer used while streaming
    pub buffer_size: usize,
}

/// Where packaged resources come from
#[derive(Debug, Deserialize, Clone)]
pub struct ResourcesConfig {
    pub source: ResourceSource,
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResourceSource {
    /// Assets compiled into the binary
    Embedded,
    /// Unpacked tree on disk
    Directory,
}
