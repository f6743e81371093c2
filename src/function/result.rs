//! The value a handler returns, as an explicit variant type.
//!
//! Handlers that build replies in Rust construct a [`HandlerResult`]
//! directly. Handlers that work with loose JSON values go through
//! [`HandlerResult::from_value`], which resolves the shape of each field
//! once, up front.

use crate::error::InvocationError;
use serde_json::{Map, Value};

/// Response body as returned by the handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    /// No body entry.
    #[default]
    Empty,
    /// A mapping to be serialized as JSON.
    Structured(Map<String, Value>),
    /// A plain value, already stringified.
    Text(String),
}

/// Response headers as returned by the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Headers {
    /// Ordered `(name, value)` pairs, passed through untouched.
    PairList(Vec<(String, String)>),
    /// A name -> value mapping, flattened in insertion order.
    FromMapping(Vec<(String, String)>),
}

impl Default for Headers {
    fn default() -> Self {
        Headers::PairList(Vec::new())
    }
}

/// A present handler result. Absence is modelled as `Option::None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerResult {
    pub status_code: Option<u16>,
    pub body: Body,
    pub headers: Option<Headers>,
}

impl HandlerResult {
    /// A result with no fields set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status code.
    pub fn status(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Set a plain-text body.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Body::Text(body.into());
        self
    }

    /// Set a structured body.
    pub fn json(mut self, body: Map<String, Value>) -> Self {
        self.body = Body::Structured(body);
        self
    }

    /// Append a header pair. A mapping given earlier keeps its kind.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let pair = (name.into(), value.into());
        match self.headers.get_or_insert_with(Headers::default) {
            Headers::PairList(pairs) => pairs.push(pair),
            Headers::FromMapping(entries) => {
                match entries.iter_mut().find(|(k, _)| *k == pair.0) {
                    Some(existing) => existing.1 = pair.1,
                    None => entries.push(pair),
                }
            }
        }
        self
    }

    /// Set headers from a name -> value mapping.
    pub fn header_map<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut flattened: Vec<(String, String)> = Vec::new();
        for (k, v) in entries {
            let (k, v) = (k.into(), v.into());
            match flattened.iter_mut().find(|(name, _)| *name == k) {
                Some(existing) => existing.1 = v,
                None => flattened.push((k, v)),
            }
        }
        self.headers = Some(Headers::FromMapping(flattened));
        self
    }

    /// Resolve a loose JSON value into a result.
    ///
    /// `null` is the absent result. Objects are dispatched on the shape of
    /// `statusCode`, `body` and `headers`; other keys are ignored.
    pub fn from_value(value: Value) -> Result<Option<Self>, InvocationError> {
        let mut fields = match value {
            Value::Null => return Ok(None),
            Value::Object(fields) => fields,
            other => {
                return Err(InvocationError::malformed(format!(
                    "expected an object or null, got {}",
                    kind(&other)
                )))
            }
        };

        let status_code = fields.remove("statusCode").map(status_from_value).transpose()?;
        let body = fields.remove("body").map(body_from_value).unwrap_or_default();
        let headers = fields.remove("headers").map(headers_from_value).transpose()?;

        Ok(Some(Self {
            status_code,
            body,
            headers,
        }))
    }
}

impl TryFrom<Value> for HandlerResult {
    type Error = InvocationError;

    /// Like [`HandlerResult::from_value`], but `null` becomes an empty result.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(Self::from_value(value)?.unwrap_or_default())
    }
}

fn status_from_value(value: Value) -> Result<u16, InvocationError> {
    value
        .as_u64()
        .and_then(|code| u16::try_from(code).ok())
        .ok_or_else(|| {
            InvocationError::malformed(format!(
                "statusCode must be an integer in 0..=65535, got {}",
                value
            ))
        })
}

fn body_from_value(value: Value) -> Body {
    match value {
        Value::Object(map) => Body::Structured(map),
        Value::String(s) => Body::Text(s),
        other => Body::Text(other.to_string()),
    }
}

fn headers_from_value(value: Value) -> Result<Headers, InvocationError> {
    match value {
        Value::Object(map) => Ok(Headers::FromMapping(
            map.into_iter().map(|(k, v)| (k, stringify(v))).collect(),
        )),
        Value::Array(items) => items
            .into_iter()
            .map(pair_from_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Headers::PairList),
        other => Err(InvocationError::malformed(format!(
            "headers must be an object or a list of pairs, got {}",
            kind(&other)
        ))),
    }
}

fn pair_from_value(value: Value) -> Result<(String, String), InvocationError> {
    if let Value::Array(mut pair) = value {
        if pair.len() == 2 {
            let value = pair.pop().map(stringify).unwrap_or_default();
            if let Some(Value::String(name)) = pair.pop() {
                return Ok((name, value));
            }
        }
    }
    Err(InvocationError::malformed(
        "header entries must be [name, value] pairs with a string name",
    ))
}

fn stringify(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
