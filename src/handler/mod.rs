//! Request handler module
//!
//! Bridges hyper connections to the API layer: buffers the request,
//! dispatches it and records the access log line.

pub mod router;

// Re-export main entry point
pub use router::{handle_request, respond};
