//! HTTP cache validation module
//!
//! `ETag` generation and `If-None-Match` handling for static files.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate a weak `ETag` from the file length and a content hash
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("W/\"{:x}-{:x}\"", content.len(), hasher.finish())
}

/// Check whether the client's `If-None-Match` matches `etag`
///
/// Accepts comma-separated lists and `*`. Comparison is weak, so a `W/`
/// prefix on either side is ignored.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    let ours = etag.trim_start_matches("W/");
    if_none_match.is_some_and(|header| {
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate.trim_start_matches("W/") == ours
        })
    })
}
