// Server module entry
// Listener setup, per-connection serving and graceful shutdown

pub mod connection;
pub mod listener;
pub mod serve;
pub mod signal;

// Re-export commonly used items
pub use listener::create_reusable_listener;
pub use serve::{serve, serve_until};
