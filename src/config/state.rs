// Application state module
// Holds the loaded configuration and values captured at startup

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use super::types::Config;

/// Application state shared by every connection
pub struct AppState {
    pub config: Config,
    /// Captured at startup, used for `/health` uptime
    pub started_at: Instant,
    /// Host name resolved once at startup
    pub hostname: String,
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            started_at: Instant::now(),
            hostname: crate::handler::system::hostname(),
            active_connections: AtomicUsize::new(0),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn connection_count(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }
}
