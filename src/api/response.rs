// API reply type
// Status and JSON payload of a successful route, before it becomes a hyper response

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};

use super::ApiError;
use crate::http;

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    pub const fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    pub const fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Serialize a response model
    pub fn model<T: Serialize>(status: StatusCode, model: &T) -> Result<Self, ApiError> {
        Ok(Self::new(status, serde_json::to_value(model)?))
    }

    /// Body holding exactly one `key: value` entry
    pub fn single_entry(status: StatusCode, key: String, value: Value) -> Self {
        let mut map = Map::new();
        map.insert(key, value);
        Self::new(status, Value::Object(map))
    }

    pub fn into_response(self, server_name: &str) -> Response<Full<Bytes>> {
        http::json_response(self.status, &self.body, server_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_entry() {
        let reply = Reply::single_entry(StatusCode::CREATED, "3".to_string(), json!("It exists!"));
        assert_eq!(reply.status, StatusCode::CREATED);
        assert_eq!(reply.body, json!({ "3": "It exists!" }));
    }

    #[test]
    fn test_into_response_keeps_status() {
        let response = Reply::ok(json!({ "message": "Hello World" })).into_response("s");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
