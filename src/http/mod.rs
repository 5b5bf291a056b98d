//! HTTP protocol layer module
//!
//! Response builders, cache validation and MIME detection, kept apart from
//! the route handlers that use them.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used items
pub use response::{
    build_304_response, build_file_response, build_json_response, build_json_response_lossy,
    build_redirect_response, HttpResponse,
};
