//! Routing module
//!
//! Method + path-template dispatch with `{name}` path parameters.

mod matcher;

pub use matcher::{match_template, PathParams, RouteMatch, RouteTable};
