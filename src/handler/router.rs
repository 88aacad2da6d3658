//! Request entry module
//!
//! Entry point for HTTP request processing: size checks, body collection,
//! preflight handling, API dispatch and the access log line.

use crate::api::{self, ApiError};
use crate::config::AppState;
use crate::http::{self, ApiRequest};
use crate::logger::{self, AccessLogEntry};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes, Incoming};
use hyper::header::{CONTENT_LENGTH, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let config = &state.config;

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = version_label(parts.version).to_string();
    entry.user_agent = parts
        .headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    logger::log_headers_count(parts.headers.len(), config.logging.show_headers);

    let response = if parts.method == Method::OPTIONS {
        http::build_options_response(config.http.enable_cors, &config.http.server_name)
    } else {
        match read_body(&parts.headers, body, config.http.max_body_size).await {
            Ok(bytes) => {
                let request = ApiRequest::new(parts.method, &parts.uri, parts.headers, bytes);
                respond(&request, &state)
            }
            Err(err) => err.into_response(&config.http.server_name),
        }
    };

    if config.logging.access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .map_or(0, |n| usize::try_from(n).unwrap_or(usize::MAX));
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &config.logging.access_log_format);
    }
    Ok(response)
}

/// Dispatch a buffered request and build its response
pub fn respond(request: &ApiRequest, state: &AppState) -> Response<Full<Bytes>> {
    let server_name = &state.config.http.server_name;
    let response = match api::dispatch(request, state) {
        Ok(reply) => reply.into_response(server_name),
        Err(err) => err.into_response(server_name),
    };
    if state.config.http.enable_cors {
        http::with_cors(response)
    } else {
        response
    }
}

/// Collect the request body, refusing anything over `max_body_size`
async fn read_body(
    headers: &hyper::HeaderMap,
    body: Incoming,
    max_body_size: u64,
) -> Result<Bytes, ApiError> {
    check_body_size(headers, max_body_size)?;

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_error(&format!(
                "Request body too large: exceeded {max_body_size} bytes while reading"
            ));
            Err(ApiError::PayloadTooLarge {
                limit: max_body_size,
            })
        }
        Err(e) => Err(ApiError::BodyRead(e.to_string())),
    }
}

/// Validate Content-Length header before reading the body
fn check_body_size(headers: &hyper::HeaderMap, max_body_size: u64) -> Result<(), ApiError> {
    let Some(content_length) = headers.get(CONTENT_LENGTH) else {
        return Ok(());
    };
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return Ok(());
    };
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_error(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Err(ApiError::PayloadTooLarge {
                limit: max_body_size,
            })
        }
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            Ok(())
        }
        _ => Ok(()),
    }
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
