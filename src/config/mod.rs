// Configuration module entry point
// Manages application configuration and shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

use crate::handler::stream::DEFAULT_BUFFER_SIZE;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, LogFormat, LoggingConfig, PerformanceConfig, ResourceSource, ResourcesConfig,
    ServerConfig, WebjarsConfig,
};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest precedence first: built-in defaults, the config file
    /// (optional), then `WEBJARS_*` environment variables such as
    /// `WEBJARS_SERVER__PORT=9000`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "text")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("webjars.context_path", "")?
            .set_default("webjars.resource_root", "/META-INF/resources")?
            .set_default("webjars.cache_ttl_secs", 86_400)? // 1 day
            .set_default("webjars.buffer_size", DEFAULT_BUFFER_SIZE as u64)?
            .set_default("resources.source", "embedded")?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("WEBJARS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the handler cannot work with
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.webjars.buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "webjars.buffer_size must be greater than zero".to_string(),
            ));
        }
        if !self.webjars.context_path.is_empty() && !self.webjars.context_path.starts_with('/') {
            return Err(config::ConfigError::Message(format!(
                "webjars.context_path must start with '/': '{}'",
                self.webjars.context_path
            )));
        }
        if self.resources.source == ResourceSource::Directory && self.resources.directory.is_none()
        {
            return Err(config::ConfigError::Message(
                "resources.directory is required when resources.source = \"directory\"".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn load(toml: &str) -> Result<Config, config::ConfigError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("webjars.toml");
        fs::write(&path, toml).unwrap();
        Config::load_from(path.to_str().unwrap())
    }

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("/nonexistent/webjars-config").unwrap();
        assert_eq!(cfg.webjars.resource_root, "/META-INF/resources");
        assert_eq!(cfg.webjars.cache_ttl_secs, 86_400);
        assert_eq!(cfg.webjars.buffer_size, 4096);
        assert_eq!(cfg.resources.source, ResourceSource::Embedded);
        assert_eq!(cfg.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let cfg = load(
            r#"
            [server]
            port = 9090

            [webjars]
            context_path = "/app"
            cache_ttl_secs = 60

            [resources]
            source = "directory"
            directory = "/srv/webjars"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.webjars.context_path, "/app");
        assert_eq!(cfg.webjars.cache_ttl_secs, 60);
        assert_eq!(cfg.webjars.resource_root, "/META-INF/resources");
        assert_eq!(cfg.resources.source, ResourceSource::Directory);
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let err = load("[webjars]\nbuffer_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("buffer_size"));
    }

    #[test]
    fn test_relative_context_path_rejected() {
        assert!(load("[webjars]\ncontext_path = \"app\"\n").is_err());
    }

    #[test]
    fn test_directory_source_needs_directory() {
        assert!(load("[resources]\nsource = \"directory\"\n").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::load_from("/nonexistent/webjars-config").unwrap();
        assert_eq!(cfg.get_socket_addr().unwrap().port(), cfg.server.port);
    }
}
