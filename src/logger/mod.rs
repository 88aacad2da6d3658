//! Logger module
//!
//! Provides logging utilities for the API server including:
//! - Server lifecycle logging
//! - Access logging in combined, common or json format
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        Level::parse(&config.logging.level),
    )
}

fn write_info(level: Level, message: &str) {
    match writer::get() {
        Some(w) if w.enabled(level) => w.write_access(message),
        Some(_) => {}
        None => println!("{message}"),
    }
}

fn write_error(level: Level, message: &str) {
    match writer::get() {
        Some(w) if w.enabled(level) => w.write_error(message),
        Some(_) => {}
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, known_people: usize) {
    write_info(Level::Info, "======================================");
    write_info(Level::Info, "Person API started successfully");
    write_info(Level::Info, &format!("Listening on: http://{addr}"));
    write_info(Level::Info, &format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(Level::Info, &format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(Level::Info, &format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(Level::Info, &format!("Error log: {path}"));
    }
    write_info(
        Level::Info,
        &format!("Max body size: {} bytes", config.http.max_body_size),
    );
    write_info(Level::Info, &format!("Known person ids: {known_people}"));
    if config.compat.legacy_status_codes {
        write_info(Level::Info, "Legacy status codes: 201 on lookup, 204 on update");
    }
    write_info(Level::Info, "======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(Level::Debug, &format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(Level::Error, &format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(Level::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(Level::Warn, &format!("[WARN] {message}"));
}

pub fn log_info(message: &str) {
    write_info(Level::Info, &format!("[INFO] {message}"));
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        write_info(Level::Info, &format!("[Headers] Count: {count}"));
    }
}

/// Log a validation failure with the offending field locations
pub fn log_validation_failure(method: &str, path: &str, fields: &[String]) {
    write_info(
        Level::Debug,
        &format!("[Validation] {method} {path} rejected: {}", fields.join(", ")),
    );
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(Level::Info, &entry.format(format));
}

pub fn log_shutdown_started(active: usize) {
    write_info(
        Level::Info,
        &format!("[Shutdown] Signal received, draining {active} active connection(s)"),
    );
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        write_info(Level::Info, "[Shutdown] All connections closed");
    } else {
        log_warning(&format!(
            "[Shutdown] Drain deadline reached with {remaining} connection(s) still open"
        ));
    }
}
