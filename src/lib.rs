//! Person API
//!
//! A small validated HTTP API: person records, lookups by query and path,
//! form logins, a contact form and image uploads, served over hyper.

pub mod api;
pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod schema;
pub mod server;
