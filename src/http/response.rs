//! The response triple produced by the formatter.

/// Content type written for structured (JSON) bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// The `(body, status, headers)` triple handed to the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedResponse {
    /// Response payload.
    pub body: String,
    /// Status code, passed through from the handler unvalidated.
    pub status_code: u16,
    /// Handler headers, in order. Duplicates are kept.
    pub headers: Vec<(String, String)>,
    /// Whether `body` is serialized JSON. The server then defaults
    /// `Content-Type` to [`JSON_CONTENT_TYPE`].
    pub structured: bool,
}

impl FormattedResponse {
    /// An empty `200` response with no headers.
    pub fn empty() -> Self {
        Self {
            body: String::new(),
            status_code: 200,
            headers: Vec::new(),
            structured: false,
        }
    }

    /// First header value whose name matches case-insensitively.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the handler supplied a header with this name.
    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }

    /// Parse the body as JSON.
    pub fn json_body<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

impl Default for FormattedResponse {
    fn default() -> Self {
        Self::empty()
    }
}
