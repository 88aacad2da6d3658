//! Buffered request
//!
//! The connection layer collects the body up front so that routing and
//! validation work on plain data and can be exercised without a socket.

use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, CONTENT_TYPE, COOKIE};
use hyper::{Method, Uri};

use super::form::{FormData, FormError};

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// Raw query string, without the leading `?`
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiRequest {
    pub fn new(method: Method, uri: &Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(ToString::to_string),
            headers,
            body,
        }
    }

    /// Decoded query parameters in request order
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Header value as text; non-UTF-8 values are treated as absent
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(&CONTENT_TYPE)
    }

    /// Named cookie from any `Cookie` header
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .find_map(|pair| {
                let (k, v) = pair.split_once('=')?;
                (k.trim() == name).then(|| v.trim().trim_matches('"').to_string())
            })
    }

    pub fn form(&self) -> Result<FormData, FormError> {
        FormData::parse(self.content_type(), &self.body)
    }
}

/// Builder used by handler tests
#[cfg(test)]
pub struct TestRequest {
    inner: ApiRequest,
}

#[cfg(test)]
impl TestRequest {
    pub fn new(method: Method, target: &str) -> Self {
        let uri: Uri = target.parse().expect("valid test uri");
        Self {
            inner: ApiRequest::new(method, &uri, HeaderMap::new(), Bytes::new()),
        }
    }

    pub fn header(mut self, name: HeaderName, value: &str) -> Self {
        self.inner
            .headers
            .append(name, hyper::header::HeaderValue::from_str(value).expect("valid header value"));
        self
    }

    pub fn json(self, value: &serde_json::Value) -> Self {
        let mut req = self.header(CONTENT_TYPE, "application/json");
        req.inner.body = Bytes::from(value.to_string());
        req
    }

    pub fn form(self, pairs: &[(&str, &str)]) -> Self {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        let mut req = self.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        req.inner.body = Bytes::from(encoded);
        req
    }

    pub fn body(mut self, content_type: &str, body: Bytes) -> Self {
        self = self.header(CONTENT_TYPE, content_type);
        self.inner.body = body;
        self
    }

    pub fn build(self) -> ApiRequest {
        self.inner
    }
}
