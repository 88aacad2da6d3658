//! Request and response schemas
//!
//! Every schema is built through an explicit `from_*` constructor that runs
//! all of its field constraints and returns the complete list of
//! [`FieldError`]s on failure.

pub mod fields;
mod forms;
mod location;
mod person;
mod reader;

use serde::Serialize;
use serde_json::Value;

pub use fields::{Format, Issue};
pub use forms::{ContactForm, LoginForm, LoginOut};
pub use location::Location;
pub use person::{HairColor, Person, PersonOut, Secret};
#[cfg(test)]
pub use person::example_json;
pub use reader::{JsonFields, TextFields};

/// One violated constraint, located in the request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Path to the field, e.g. `["body", "person", "age"]`
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctx: Option<Value>,
}

impl FieldError {
    pub fn new(loc: Vec<String>, issue: Issue) -> Self {
        Self {
            loc,
            msg: issue.msg,
            kind: issue.kind.to_string(),
            ctx: issue.ctx,
        }
    }

    /// Dotted location for log lines
    pub fn location(&self) -> String {
        self.loc.join(".")
    }
}

/// Append the errors of one reader or schema to an accumulated list
pub fn collect<T>(result: Result<T, Vec<FieldError>>, errors: &mut Vec<FieldError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(mut found) => {
            errors.append(&mut found);
            None
        }
    }
}
