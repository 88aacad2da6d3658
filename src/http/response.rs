//! HTTP response building module
//!
//! Builds the concrete hyper responses; status and payload decisions are
//! made by the API layer.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE, SERVER};
use hyper::{Method, Response, StatusCode};
use serde::Serialize;

/// Methods answered by the CORS preflight
const CORS_METHODS: &str = "GET, POST, PUT, OPTIONS";

/// Build JSON response
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    server_name: &str,
) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            log_build_error("JSON", &e);
            return fallback(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"detail":"Internal Server Error"}"#,
            );
        }
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .header(SERVER, server_name)
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR, "Error")
        })
}

/// Append an `Allow` header listing `methods`
pub fn with_allow(mut response: Response<Full<Bytes>>, methods: &[Method]) -> Response<Full<Bytes>> {
    let allow = methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(ALLOW, value);
    }
    response
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool, server_name: &str) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, CORS_METHODS)
        .header(SERVER, server_name);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", CORS_METHODS)
            .header("Access-Control-Allow-Headers", "Content-Type, Cookie")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Add the CORS origin header to an ordinary response
pub fn with_cors(mut response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    response.headers_mut().insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static("*"),
    );
    response
}

fn fallback(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
}

fn log_build_error(what: &str, error: &impl std::fmt::Display) {
    crate::logger::log_error(&format!("Failed to build {what} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_response_headers() {
        let response = json_response(
            StatusCode::CREATED,
            &serde_json::json!({ "ok": true }),
            "person-api/test",
        );
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[SERVER], "person-api/test");
    }

    #[test]
    fn test_allow_header() {
        let response = with_allow(
            json_response(StatusCode::METHOD_NOT_ALLOWED, &(), "s"),
            &[Method::GET, Method::PUT],
        );
        assert_eq!(response.headers()[ALLOW], "GET, PUT");
    }

    #[test]
    fn test_options_with_cors() {
        let response = build_options_response(true, "s");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");

        let response = build_options_response(false, "s");
        assert!(!response.headers().contains_key("Access-Control-Allow-Origin"));
    }
}
