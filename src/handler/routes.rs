//! Route table and the JSON endpoint handlers.

use hyper::{Method, StatusCode};

use super::router::RequestContext;
use super::system;
use super::types::{HealthResponse, InfoResponse, UsersResponse, WelcomeResponse, USERS};
use super::HandlerError;
use crate::config::AppState;
use crate::http::{build_json_response, HttpResponse};

/// Signature shared by every route handler
pub type HandlerFn = fn(&RequestContext<'_>, &AppState) -> Result<HttpResponse, HandlerError>;

/// A (method, path) pair mapped to a handler
pub struct Route {
    pub method: Method,
    pub path: &'static str,
    pub handler: HandlerFn,
    pub description: &'static str,
}

impl Route {
    /// Match the way the routes are declared: GET also answers HEAD, paths
    /// compare case-insensitively and tolerate one trailing slash.
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        let method_ok = *method == self.method
            || (self.method == Method::GET && *method == Method::HEAD);
        method_ok && normalize(path).eq_ignore_ascii_case(self.path)
    }
}

fn normalize(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(rest) if !rest.is_empty() && !rest.ends_with('/') => rest,
        _ => path,
    }
}

/// Application routes, matched in order
pub static ROUTES: [Route; 4] = [
    Route {
        method: Method::GET,
        path: "/",
        handler: welcome,
        description: "Welcome message",
    },
    Route {
        method: Method::GET,
        path: "/health",
        handler: health,
        description: "Health check",
    },
    Route {
        method: Method::GET,
        path: "/api/info",
        handler: info,
        description: "Application info",
    },
    Route {
        method: Method::GET,
        path: "/api/users",
        handler: users,
        description: "Sample users data",
    },
];

/// `GET /`
pub fn welcome(ctx: &RequestContext<'_>, state: &AppState) -> Result<HttpResponse, HandlerError> {
    let app = &state.config.app;
    let body = WelcomeResponse {
        message: format!("Welcome to {}!", app.name),
        timestamp: system::iso_timestamp(),
        version: &app.version,
        environment: &app.environment,
        hostname: &state.hostname,
    };
    Ok(build_json_response(StatusCode::OK, &body, ctx.is_head)?)
}

/// `GET /health`, always 200
pub fn health(ctx: &RequestContext<'_>, state: &AppState) -> Result<HttpResponse, HandlerError> {
    let body = HealthResponse {
        status: "healthy",
        timestamp: system::iso_timestamp(),
        uptime: state.uptime().as_secs_f64(),
        hostname: &state.hostname,
    };
    Ok(build_json_response(StatusCode::OK, &body, ctx.is_head)?)
}

/// `GET /api/info`
pub fn info(ctx: &RequestContext<'_>, state: &AppState) -> Result<HttpResponse, HandlerError> {
    let app = &state.config.app;
    let body = InfoResponse {
        app: &app.name,
        version: &app.version,
        runtime_version: system::RUNTIME_VERSION,
        platform: system::platform(),
        memory_usage: system::memory_usage(),
        hostname: &state.hostname,
        timestamp: system::iso_timestamp(),
    };
    Ok(build_json_response(StatusCode::OK, &body, ctx.is_head)?)
}

/// `GET /api/users`
pub fn users(ctx: &RequestContext<'_>, _state: &AppState) -> Result<HttpResponse, HandlerError> {
    let body = UsersResponse {
        users: &USERS,
        count: USERS.len(),
        timestamp: system::iso_timestamp(),
    };
    Ok(build_json_response(StatusCode::OK, &body, ctx.is_head)?)
}
