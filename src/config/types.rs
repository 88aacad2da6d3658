// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub people: PeopleConfig,
    #[serde(default)]
    pub compat: CompatConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// Access log format (combined, common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    /// Seconds to wait for open connections after a shutdown signal
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

const fn default_shutdown_timeout() -> u64 {
    10
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    /// Upper bound for a collected request body, uploads included
    pub max_body_size: u64,
}

/// Seed data for the read-only person registry
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PeopleConfig {
    #[serde(default = "default_known_ids")]
    pub known_ids: Vec<i64>,
}

fn default_known_ids() -> Vec<i64> {
    vec![1, 2, 3, 4, 5]
}

impl Default for PeopleConfig {
    fn default() -> Self {
        Self {
            known_ids: default_known_ids(),
        }
    }
}

/// Wire-compatibility switches
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct CompatConfig {
    /// Answer the id lookup with 201 and the update with 204.
    /// When false both answer 200.
    #[serde(default = "default_legacy_status_codes")]
    pub legacy_status_codes: bool,
}

#[allow(clippy::missing_const_for_fn)]
fn default_legacy_status_codes() -> bool {
    true
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            legacy_status_codes: default_legacy_status_codes(),
        }
    }
}
