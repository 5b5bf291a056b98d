//! Request handler module
//!
//! Route table, JSON endpoint handlers, static file serving and the
//! dispatcher tying them together.

pub mod router;
pub mod routes;
pub mod static_files;
pub mod system;
pub mod types;

use thiserror::Error;

// Re-export main entry point
pub use router::handle_request;
pub use routes::ROUTES;

/// Failure inside a route handler; always surfaces to the client as a 500
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("{0}")]
    Internal(String),
}
