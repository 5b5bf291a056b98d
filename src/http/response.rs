//! HTTP response building module
//!
//! Builders for the JSON and static-file responses the server sends.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Response type produced by every handler
pub type HttpResponse = Response<Full<Bytes>>;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Body used when even the error envelope cannot be serialized
const FALLBACK_ERROR_BODY: &str = r#"{"error":"Something went wrong!"}"#;

/// Serialize `body` and build a JSON response
///
/// HEAD requests keep `Content-Length` of the full body but send no bytes.
pub fn build_json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    is_head: bool,
) -> Result<HttpResponse, serde_json::Error> {
    let json = serde_json::to_vec(body)?;
    Ok(build_raw_json(status, Bytes::from(json), is_head))
}

/// Build a JSON response, degrading to a fixed 500 body if serialization fails
pub fn build_json_response_lossy<T: Serialize>(
    status: StatusCode,
    body: &T,
    is_head: bool,
) -> HttpResponse {
    build_json_response(status, body, is_head).unwrap_or_else(|e| {
        crate::logger::log_error(&format!("Failed to serialize response: {e}"));
        build_raw_json(
            StatusCode::INTERNAL_SERVER_ERROR,
            Bytes::from_static(FALLBACK_ERROR_BODY.as_bytes()),
            is_head,
        )
    })
}

fn build_raw_json(status: StatusCode, json: Bytes, is_head: bool) -> HttpResponse {
    let content_length = json.len();
    let body = if is_head { Bytes::new() } else { json };

    Response::builder()
        .status(status)
        .header("Content-Type", JSON_CONTENT_TYPE)
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header("ETag", etag)
        .header("Cache-Control", "public, max-age=0")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 200 response for a static file with its `ETag`
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
    is_head: bool,
) -> HttpResponse {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("ETag", etag)
        .header("Cache-Control", "public, max-age=0")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 301 response pointing a directory request at its trailing-slash form
pub fn build_redirect_response(location: &str, is_head: bool) -> HttpResponse {
    let escaped = escape_html(location);
    let html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Redirecting</title></head>\n<body><pre>Redirecting to <a href=\"{escaped}\">{escaped}</a></pre></body>\n</html>\n"
    );
    let content_length = html.len();
    let body = if is_head { Bytes::new() } else { Bytes::from(html) };

    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header("Location", location)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
