//! Startup and runtime error types.

use thiserror::Error;

/// Errors that stop the server from starting or running.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration could not be loaded or deserialized.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Socket or filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// `host:port` did not parse as a socket address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The tracing subscriber could not be installed.
    #[error("logger error: {0}")]
    Logger(String),
}
