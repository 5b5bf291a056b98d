//! Process and host introspection used by the JSON endpoints.

use chrono::{SecondsFormat, Utc};
use sysinfo::System;

use super::types::MemoryUsage;

/// `rustc --version` of the compiler that built this binary
pub const RUNTIME_VERSION: &str = env!("RUSTC_VERSION");

/// Current UTC time as ISO-8601 with milliseconds, e.g. `2024-05-01T12:00:00.000Z`
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Host name of this machine, `"unknown"` when the OS won't say
pub fn hostname() -> String {
    System::host_name()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// OS identifier (`linux`, `macos`, `windows`, ...)
pub const fn platform() -> &'static str {
    std::env::consts::OS
}

/// Snapshot of this process's memory and the host's totals
pub fn memory_usage() -> MemoryUsage {
    let mut sys = System::new();
    sys.refresh_memory();

    let mut usage = MemoryUsage {
        system_total: sys.total_memory(),
        system_used: sys.used_memory(),
        ..MemoryUsage::default()
    };

    if let Ok(pid) = sysinfo::get_current_pid() {
        if sys.refresh_process(pid) {
            if let Some(process) = sys.process(pid) {
                usage.rss = process.memory();
                usage.virtual_memory = process.virtual_memory();
            }
        }
    }

    usage
}
