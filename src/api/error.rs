// API error type
// Every failure a route can produce, and its single mapping to a response

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;

use crate::http::{self, FormError};
use crate::schema::FieldError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more request fields violated their constraints
    #[error("{} field(s) failed validation", .0.len())]
    Validation(Vec<FieldError>),

    /// Explicitly raised by a handler
    #[error("{detail}")]
    NotFound { detail: String },

    #[error("no route for {0}")]
    RouteNotFound(String),

    #[error("method not allowed")]
    MethodNotAllowed { allow: Vec<Method> },

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("malformed form body: {0}")]
    MalformedForm(#[from] FormError),

    /// A handler produced a value its response model rejects
    #[error("response failed validation on {} field(s)", .0.len())]
    ResponseValidation(Vec<FieldError>),

    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ApiError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound {
            detail: detail.into(),
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound { .. } | Self::RouteNotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BodyRead(_) | Self::MalformedForm(_) => StatusCode::BAD_REQUEST,
            Self::ResponseValidation(_) | Self::Serialize(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn body(&self) -> Value {
        match self {
            Self::Validation(errors) => json!({ "detail": errors }),
            Self::NotFound { detail } => json!({
                "status_code": self.status().as_u16(),
                "detail": detail,
            }),
            Self::RouteNotFound(_) => json!({ "detail": "Not Found" }),
            Self::MethodNotAllowed { .. } => json!({ "detail": "Method Not Allowed" }),
            Self::PayloadTooLarge { limit } => json!({
                "detail": format!("Request body exceeds {limit} bytes"),
            }),
            Self::BodyRead(_) | Self::MalformedForm(_) => {
                json!({ "detail": "There was an error parsing the body" })
            }
            Self::ResponseValidation(_) | Self::Serialize(_) => {
                json!({ "detail": "Internal Server Error" })
            }
        }
    }

    /// Whether the failure is the server's fault rather than the client's
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }

    pub fn into_response(self, server_name: &str) -> Response<Full<Bytes>> {
        let response = http::json_response(self.status(), &self.body(), server_name);
        match self {
            Self::MethodNotAllowed { allow } => http::with_allow(response, &allow),
            _ => response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Issue;
    use hyper::header::ALLOW;

    #[test]
    fn test_validation_body_lists_fields() {
        let err = ApiError::Validation(vec![
            FieldError::new(
                vec!["body".to_string(), "age".to_string()],
                Issue::new("ensure this value is less than or equal to 115", "value_error.number.not_le")
                    .with_ctx(json!({ "limit_value": 115 })),
            ),
            FieldError::new(
                vec!["body".to_string(), "password".to_string()],
                Issue::missing(),
            ),
        ]);
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = err.body();
        assert_eq!(body["detail"][0]["loc"], json!(["body", "age"]));
        assert_eq!(body["detail"][0]["type"], "value_error.number.not_le");
        assert_eq!(body["detail"][0]["ctx"]["limit_value"], 115);
        assert_eq!(body["detail"][1]["msg"], "field required");
        assert!(body["detail"][1].get("ctx").is_none());
    }

    #[test]
    fn test_not_found_shape() {
        let err = ApiError::not_found("This person doesn't exist!");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            err.body(),
            json!({ "status_code": 404, "detail": "This person doesn't exist!" })
        );
    }

    #[test]
    fn test_method_not_allowed_response() {
        let response = ApiError::MethodNotAllowed {
            allow: vec![Method::POST],
        }
        .into_response("s");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "POST");
    }

    #[test]
    fn test_server_errors() {
        assert!(ApiError::ResponseValidation(vec![]).is_server_error());
        assert!(!ApiError::RouteNotFound("/x".to_string()).is_server_error());
        assert_eq!(
            ApiError::from(FormError::MissingBoundary).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
