//! Static file serving module
//!
//! Serves files from the configured public directory ahead of the route
//! table. A miss returns `None` so the router falls through to the routes.

use std::path::{Path, PathBuf};

use hyper::body::Bytes;
use tokio::fs;

use crate::config::StaticFilesConfig;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, HttpResponse};
use crate::logger;

/// Outcome of mapping a request path onto the static directory
#[derive(Debug, PartialEq, Eq)]
pub enum Resolved {
    File(PathBuf),
    /// Directory named without a trailing slash
    Directory,
}

/// Serve `ctx.path` from the static directory, if such a file exists
pub async fn serve(ctx: &RequestContext<'_>, cfg: &StaticFilesConfig) -> Option<HttpResponse> {
    let file_path = match resolve_path(&cfg.dir, ctx.path, &cfg.index_files).await? {
        Resolved::File(path) => path,
        Resolved::Directory => {
            return Some(http::build_redirect_response(
                &directory_location(ctx),
                ctx.is_head,
            ));
        }
    };

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            return None;
        }
    };

    let etag = cache::generate_etag(&content);
    if cache::check_etag_match(ctx.if_none_match, &etag) {
        return Some(http::build_304_response(&etag));
    }

    Some(http::build_file_response(
        Bytes::from(content),
        mime::content_type_for(&file_path),
        &etag,
        ctx.is_head,
    ))
}

/// `path/` with the original query string kept
fn directory_location(ctx: &RequestContext<'_>) -> String {
    let query = ctx
        .original_url
        .find('?')
        .map_or("", |i| &ctx.original_url[i..]);
    format!("{}/{query}", ctx.path)
}

/// Map a request path to a readable file inside `static_dir`
///
/// The path is percent-decoded first. Dotfiles are hidden, `..` and NUL
/// segments are refused, directories resolve to their first index file and
/// anything whose canonical path escapes `static_dir` is refused.
pub async fn resolve_path(
    static_dir: &str,
    request_path: &str,
    index_files: &[String],
) -> Option<Resolved> {
    let decoded = urlencoding::decode(request_path).ok()?;
    let relative = decoded.trim_start_matches('/');
    if relative.split('/').any(|segment| {
        segment.starts_with('.') || segment.contains('\\') || segment.contains('\0')
    }) {
        return None;
    }

    // Missing directory is reported once at startup
    let static_dir_canonical = match fs::canonicalize(static_dir).await {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!("Static directory '{static_dir}' unavailable: {e}");
            return None;
        }
    };

    let mut file_path = static_dir_canonical.join(relative);
    if is_dir(&file_path).await {
        if !decoded.ends_with('/') {
            ensure_inside(&file_path, &static_dir_canonical, request_path).await?;
            return Some(Resolved::Directory);
        }
        file_path = find_index(&file_path, index_files).await?;
    } else if decoded.ends_with('/') {
        return None;
    }

    // File not found is common (404), no need to log at warning level
    let canonical = ensure_inside(&file_path, &static_dir_canonical, request_path).await?;
    let metadata = fs::metadata(&canonical).await.ok()?;
    metadata.is_file().then_some(Resolved::File(canonical))
}

async fn ensure_inside(path: &Path, root: &Path, request_path: &str) -> Option<PathBuf> {
    let canonical = fs::canonicalize(path).await.ok()?;
    if canonical.starts_with(root) {
        Some(canonical)
    } else {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {request_path} -> {}",
            canonical.display()
        ));
        None
    }
}

/// Warn once when static serving is enabled but its directory is missing
pub fn check_static_dir(cfg: &StaticFilesConfig) {
    if cfg.enabled && !Path::new(&cfg.dir).is_dir() {
        logger::log_warning(&format!(
            "Static directory '{}' not found; static files will not be served",
            cfg.dir
        ));
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn find_index(dir: &Path, index_files: &[String]) -> Option<PathBuf> {
    for index_file in index_files {
        let candidate = dir.join(index_file);
        if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
            return Some(candidate);
        }
    }
    None
}
