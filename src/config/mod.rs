// Configuration module entry point
// Layers defaults, an optional config file and environment overrides

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::ServerError;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LogFormat, StaticFilesConfig};

/// Config file looked up in the working directory (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Plain environment variables honored on top of `APP__*` keys
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pub port: Option<String>,
    pub environment: Option<String>,
}

impl EnvOverrides {
    /// Read `PORT` and `APP_ENV` (falling back to `NODE_ENV`) from the process
    pub fn from_process_env() -> Self {
        Self {
            port: std::env::var("PORT").ok().filter(|v| !v.is_empty()),
            environment: std::env::var("APP_ENV")
                .or_else(|_| std::env::var("NODE_ENV"))
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }
}

impl Config {
    /// Load from `config.toml` (if present) and the process environment
    pub fn load() -> Result<Self, ServerError> {
        Self::load_from(DEFAULT_CONFIG_PATH, &EnvOverrides::from_process_env())
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str, overrides: &EnvOverrides) -> Result<Self, ServerError> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("app.name", "Simple App Server")?
            .set_default("app.version", env!("CARGO_PKG_VERSION"))?
            .set_default("app.environment", "development")?
            .set_default("static_files.enabled", true)?
            .set_default("static_files.dir", "public")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "text")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 60)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", overrides.port.clone())?
            .set_override_option("app.environment", overrides.environment.clone())?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|e| ServerError::InvalidAddress(format!("{addr} ({e})")))
    }
}
