//! The normalized invocation event built from an inbound HTTP request.

use crate::error::InvocationError;
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::header::{HeaderName, HeaderValue};
use http::request::Parts;
use hyper::{HeaderMap, Request};
use std::borrow::Cow;

/// HTTP method enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    /// Any other verb, stored uppercased.
    Other(String),
}

impl Method {
    /// The uppercase verb.
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Other(verb) => verb,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Method {
    fn from(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "PATCH" => Method::Patch,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            other => Method::Other(other.to_string()),
        }
    }
}

impl From<&hyper::Method> for Method {
    fn from(method: &hyper::Method) -> Self {
        match *method {
            hyper::Method::GET => Method::Get,
            hyper::Method::POST => Method::Post,
            hyper::Method::PUT => Method::Put,
            hyper::Method::DELETE => Method::Delete,
            hyper::Method::PATCH => Method::Patch,
            hyper::Method::HEAD => Method::Head,
            hyper::Method::OPTIONS => Method::Options,
            _ => Method::from(method.as_str()),
        }
    }
}

/// Query-string parameters in the order they appeared in the URL.
///
/// A name may repeat; `get` returns the first value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Parse an `application/x-www-form-urlencoded` query string.
    pub fn parse(raw: &str) -> Self {
        let pairs = url::form_urlencoded::parse(raw.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All pairs, in order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

/// One inbound HTTP request, in the form handed to the handler.
///
/// Nothing is validated or decoded: the body is the raw bytes, headers are
/// kept with every value and in arrival order.
#[derive(Debug, Clone, Default)]
pub struct Event {
    /// Raw request body.
    pub body: Bytes,
    /// Request headers (case-insensitive names, multi-valued).
    pub headers: HeaderMap,
    /// HTTP method.
    pub method: Method,
    /// Parsed query-string parameters.
    pub query: Query,
    /// Request path, wildcard suffix included.
    pub path: String,
}

impl Event {
    /// Create an empty event for the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Default::default()
        }
    }

    /// Build an event from already-split request parts and the collected body.
    pub fn from_parts(parts: &Parts, body: Bytes) -> Self {
        Self {
            body,
            headers: parts.headers.clone(),
            method: Method::from(&parts.method),
            query: parts.uri.query().map(Query::parse).unwrap_or_default(),
            path: parts.uri.path().to_string(),
        }
    }

    /// Consume a live request, reading its body exactly once.
    pub async fn from_request(req: Request<Incoming>) -> Result<Self, InvocationError> {
        let (parts, body) = req.into_parts();
        let body = body.collect().await?.to_bytes();
        Ok(Self::from_parts(&parts, body))
    }

    /// Append a header. Invalid names or values are ignored.
    pub fn header(mut self, key: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Set the query parameters from a raw query string.
    pub fn query(mut self, raw: &str) -> Self {
        self.query = Query::parse(raw);
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of a header, if it is visible ASCII.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    /// The body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Parse the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
