//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: static files first, then route
//! matching, then the 404 and 500 outcomes.

use std::any::Any;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use hyper::{Method, Request, StatusCode, Version};

use crate::config::AppState;
use crate::handler::routes::{Route, ROUTES};
use crate::handler::static_files;
use crate::handler::system;
use crate::handler::types::{ErrorResponse, NotFoundResponse};
use crate::handler::HandlerError;
use crate::http::{build_json_response_lossy, HttpResponse};
use crate::logger::{self, AccessLogEntry};

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    /// Path plus query string exactly as received
    pub original_url: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
}

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();
    let path = parts.uri.path();

    let ctx = RequestContext {
        path,
        original_url: parts
            .uri
            .path_and_query()
            .map_or(path, hyper::http::uri::PathAndQuery::as_str),
        is_head: parts.method == Method::HEAD,
        if_none_match: header_str(&parts.headers, "if-none-match"),
    };

    let response = dispatch(&parts.method, &ctx, &ROUTES, &state).await;

    let logging = &state.config.logging;
    if logging.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            parts.method.to_string(),
            path.to_string(),
        );
        entry.query = parts.uri.query().map(ToString::to_string);
        entry.http_version = version_label(parts.version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = hyper::body::Body::size_hint(response.body())
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.referer = header_str(&parts.headers, "referer").map(ToString::to_string);
        entry.user_agent = header_str(&parts.headers, "user-agent").map(ToString::to_string);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &logging.access_log_format);
    }

    Ok(response)
}

/// Resolve a request against static files (GET/HEAD), then `routes`, then 404
pub async fn dispatch(
    method: &Method,
    ctx: &RequestContext<'_>,
    routes: &[Route],
    state: &AppState,
) -> HttpResponse {
    let static_cfg = &state.config.static_files;
    if static_cfg.enabled && (*method == Method::GET || *method == Method::HEAD) {
        if let Some(resp) = static_files::serve(ctx, static_cfg).await {
            return resp;
        }
    }

    if let Some(route) = routes.iter().find(|r| r.matches(method, ctx.path)) {
        return invoke(route, method, ctx, state);
    }

    not_found(ctx)
}

/// Run a handler, turning an `Err` or a panic into the generic 500
fn invoke(
    route: &Route,
    method: &Method,
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> HttpResponse {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| (route.handler)(ctx, state)));

    let err = match outcome {
        Ok(Ok(resp)) => return resp,
        Ok(Err(e)) => e,
        Err(payload) => {
            HandlerError::Internal(format!("panic: {}", panic_message(payload.as_ref())))
        }
    };

    logger::log_handler_failure(method.as_str(), ctx.path, &err.to_string());
    internal_error(ctx.is_head)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

/// 404 carrying the requested path and query
pub fn not_found(ctx: &RequestContext<'_>) -> HttpResponse {
    let body = NotFoundResponse {
        error: "Route not found",
        path: ctx.original_url,
        timestamp: system::iso_timestamp(),
    };
    build_json_response_lossy(StatusCode::NOT_FOUND, &body, ctx.is_head)
}

/// 500 with a fixed message; details stay in the server log
pub fn internal_error(is_head: bool) -> HttpResponse {
    let body = ErrorResponse {
        error: "Something went wrong!",
        timestamp: system::iso_timestamp(),
    };
    build_json_response_lossy(StatusCode::INTERNAL_SERVER_ERROR, &body, is_head)
}

fn header_str<'a>(headers: &'a hyper::HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, EnvOverrides};
    use http_body_util::BodyExt;
    use serde_json::Value;

    fn test_state(static_dir: &str) -> Arc<AppState> {
        let mut cfg = Config::load_from("does-not-exist/config", &EnvOverrides::default()).unwrap();
        cfg.static_files.dir = static_dir.to_string();
        cfg.logging.access_log = false;
        Arc::new(AppState::new(cfg))
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    async fn send(state: &Arc<AppState>, method: Method, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder().method(method).uri(uri).body(()).unwrap();
        let resp = handle_request(req, Arc::clone(state), peer()).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn assert_timestamp(value: &Value) {
        let ts = value["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[tokio::test]
    async fn test_welcome() {
        let state = test_state("no-public-dir");
        let (status, body) = send(&state, Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        for key in ["message", "timestamp", "version", "environment", "hostname"] {
            assert!(body.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(body["message"], "Welcome to Simple App Server!");
        assert_eq!(body["version"], "1.0.0");
        assert_eq!(body["environment"], "development");
        assert_timestamp(&body);
    }

    #[tokio::test]
    async fn test_health() {
        let state = test_state("no-public-dir");
        let (status, body) = send(&state, Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body["uptime"].as_f64().unwrap() >= 0.0);
        assert_eq!(body["hostname"], state.hostname.as_str());
    }

    #[tokio::test]
    async fn test_info() {
        let state = test_state("no-public-dir");
        let (status, body) = send(&state, Method::GET, "/api/info").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["app"], "Simple App Server");
        assert_eq!(body["platform"], std::env::consts::OS);
        assert!(body["runtime_version"].as_str().unwrap().starts_with("rustc"));
        for key in ["rss", "virtual", "system_total", "system_used"] {
            assert!(body["memory_usage"][key].is_u64(), "memory_usage.{key}");
        }
        assert_timestamp(&body);
    }

    #[tokio::test]
    async fn test_users() {
        let state = test_state("no-public-dir");
        let (status, body) = send(&state, Method::GET, "/api/users").await;
        assert_eq!(status, StatusCode::OK);
        let users = body["users"].as_array().unwrap();
        assert_eq!(users.len(), 3);
        assert_eq!(body["count"], 3);
        assert_eq!(
            users[0],
            serde_json::json!({"id": 1, "name": "John Doe", "email": "john@example.com"})
        );
        assert_eq!(users[2]["email"], "bob@example.com");
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let state = test_state("no-public-dir");
        let (status, body) = send(&state, Method::HEAD, "/api/users").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_not_found_echoes_path_and_query() {
        let state = test_state("no-public-dir");
        let (status, body) = send(&state, Method::GET, "/nope/here?x=1&y=2").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Route not found");
        assert_eq!(body["path"], "/nope/here?x=1&y=2");
        assert_timestamp(&body);
    }

    #[tokio::test]
    async fn test_other_methods_are_not_found() {
        let state = test_state("no-public-dir");
        let (status, body) = send(&state, Method::POST, "/api/users").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["path"], "/api/users");

        let (status, _) = send(&state, Method::DELETE, "/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_index_file_shadows_welcome() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/index.html"), "<a href=x.html>").unwrap();
        std::fs::write(dir.path().join("my file.txt"), "spaced").unwrap();
        let state = test_state(dir.path().to_str().unwrap());

        let req = Request::builder().uri("/").body(()).unwrap();
        let resp = handle_request(req, Arc::clone(&state), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "text/html; charset=utf-8");
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"<h1>home</h1>");

        let req = Request::builder().uri("/docs?tab=1").body(()).unwrap();
        let resp = handle_request(req, Arc::clone(&state), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()["location"], "/docs/?tab=1");

        let req = Request::builder().uri("/my%20file.txt").body(()).unwrap();
        let resp = handle_request(req, Arc::clone(&state), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"spaced");
    }

    #[tokio::test]
    async fn test_static_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("robots.txt"), "User-agent: *\n").unwrap();
        std::fs::write(dir.path().join("health"), "shadowed").unwrap();
        let state = test_state(dir.path().to_str().unwrap());

        let req = Request::builder().uri("/robots.txt").body(()).unwrap();
        let resp = handle_request(req, Arc::clone(&state), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "text/plain; charset=utf-8");
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"User-agent: *\n");

        // files shadow routes of the same name
        let req = Request::builder().uri("/health").body(()).unwrap();
        let resp = handle_request(req, Arc::clone(&state), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"shadowed");

        // a miss falls through to the routes
        let (status, body) = send(&state, Method::GET, "/api/users").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 3);

        // static files only answer GET and HEAD
        let (status, _) = send(&state, Method::POST, "/robots.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    fn failing(_: &RequestContext<'_>, _: &AppState) -> Result<HttpResponse, HandlerError> {
        Err(HandlerError::Internal("database secret leaked".to_string()))
    }

    fn failing_serialize(
        _: &RequestContext<'_>,
        _: &AppState,
    ) -> Result<HttpResponse, HandlerError> {
        let err = serde_json::from_str::<Value>("{\"secret\": ").unwrap_err();
        Err(HandlerError::Serialize(err))
    }

    fn panicking(_: &RequestContext<'_>, _: &AppState) -> Result<HttpResponse, HandlerError> {
        panic!("handler blew up with secret detail");
    }

    async fn dispatch_to(handler: crate::handler::routes::HandlerFn) -> (StatusCode, String) {
        let state = test_state("no-public-dir");
        let routes = [Route {
            method: Method::GET,
            path: "/boom",
            handler,
            description: "fault injection",
        }];
        let ctx = RequestContext {
            path: "/boom",
            original_url: "/boom",
            is_head: false,
            if_none_match: None,
        };
        let resp = dispatch(&Method::GET, &ctx, &routes, &state).await;
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_handler_error_becomes_500() {
        let (status, raw) = dispatch_to(failing).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!raw.contains("secret"));

        let body: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(body["error"], "Something went wrong!");
        assert_timestamp(&body);
        assert_eq!(body.as_object().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_serialize_error_becomes_500() {
        let (status, raw) = dispatch_to(failing_serialize).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!raw.contains("secret"));
    }

    #[test]
    fn test_handler_internal_error_display() {
        let err = HandlerError::Internal("panic: boom".to_string());
        assert_eq!(err.to_string(), "panic: boom");
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_500() {
        let (status, raw) = dispatch_to(panicking).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!raw.contains("secret"));
        assert!(!raw.contains("panic"));
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(payload.as_ref()), "static str");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
