// Response envelope types
// One serializable struct per endpoint, built fresh for each request

use serde::Serialize;

/// Sample user record served by `/api/users`
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: u32,
    pub name: &'static str,
    pub email: &'static str,
}

pub static USERS: [User; 3] = [
    User {
        id: 1,
        name: "John Doe",
        email: "john@example.com",
    },
    User {
        id: 2,
        name: "Jane Smith",
        email: "jane@example.com",
    },
    User {
        id: 3,
        name: "Bob Johnson",
        email: "bob@example.com",
    },
];

/// `GET /`
#[derive(Debug, Serialize)]
pub struct WelcomeResponse<'a> {
    pub message: String,
    pub timestamp: String,
    pub version: &'a str,
    pub environment: &'a str,
    pub hostname: &'a str,
}

/// `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse<'a> {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since startup
    pub uptime: f64,
    pub hostname: &'a str,
}

/// Memory snapshot in bytes; unreadable values are 0
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MemoryUsage {
    pub rss: u64,
    #[serde(rename = "virtual")]
    pub virtual_memory: u64,
    pub system_total: u64,
    pub system_used: u64,
}

/// `GET /api/info`
#[derive(Debug, Serialize)]
pub struct InfoResponse<'a> {
    pub app: &'a str,
    pub version: &'a str,
    pub runtime_version: &'static str,
    pub platform: &'static str,
    pub memory_usage: MemoryUsage,
    pub hostname: &'a str,
    pub timestamp: String,
}

/// `GET /api/users`
#[derive(Debug, Serialize)]
pub struct UsersResponse<'a> {
    pub users: &'a [User],
    pub count: usize,
    pub timestamp: String,
}

/// Body of every 404
#[derive(Debug, Serialize)]
pub struct NotFoundResponse<'a> {
    pub error: &'static str,
    pub path: &'a str,
    pub timestamp: String,
}

/// Body of every 500; never carries failure details
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub timestamp: String,
}
