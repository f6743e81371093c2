//! Maps a handler result onto the `(body, status, headers)` triple.

use crate::error::InvocationError;
use crate::function::result::{Body, HandlerResult, Headers};
use crate::http::FormattedResponse;

/// Status used when the handler does not provide one.
pub const DEFAULT_STATUS: u16 = 200;

/// Format a handler result.
///
/// An absent result is an empty `200`. Otherwise each field is defaulted
/// independently: no status means `200`, no body means `""`, no headers
/// means `[]`. A provided status is used as-is, even `0`; the server is
/// the one that rejects codes HTTP cannot carry.
pub fn format_response(
    result: Option<&HandlerResult>,
) -> Result<FormattedResponse, InvocationError> {
    let Some(result) = result else {
        return Ok(FormattedResponse::empty());
    };

    let (body, structured) = format_body(&result.body)?;

    Ok(FormattedResponse {
        body,
        status_code: result.status_code.unwrap_or(DEFAULT_STATUS),
        headers: format_headers(result.headers.as_ref()),
        structured,
    })
}

fn format_body(body: &Body) -> Result<(String, bool), InvocationError> {
    match body {
        Body::Empty => Ok((String::new(), false)),
        Body::Structured(map) => Ok((serde_json::to_string(map)?, true)),
        Body::Text(text) => Ok((text.clone(), false)),
    }
}

fn format_headers(headers: Option<&Headers>) -> Vec<(String, String)> {
    match headers {
        None => Vec::new(),
        Some(Headers::PairList(pairs)) | Some(Headers::FromMapping(pairs)) => pairs.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn format_value(value: Value) -> FormattedResponse {
        let result = HandlerResult::from_value(value).unwrap();
        format_response(result.as_ref()).unwrap()
    }

    #[test]
    fn test_absent_result() {
        let response = format_response(None).unwrap();
        assert_eq!(response.body, "");
        assert_eq!(response.status_code, 200);
        assert!(response.headers.is_empty());
    }

    #[test]
    fn test_status_defaults_and_passthrough() {
        assert_eq!(format_value(json!({})).status_code, 200);
        assert_eq!(format_value(json!({"body": "x"})).status_code, 200);
        assert_eq!(format_value(json!({"statusCode": 418})).status_code, 418);
        assert_eq!(format_value(json!({"statusCode": 0})).status_code, 0);
    }

    #[test]
    fn test_missing_body_is_empty() {
        let response = format_value(json!({"statusCode": 204}));
        assert_eq!(response.body, "");
        assert!(!response.structured);
    }

    #[test]
    fn test_structured_body_round_trips() {
        let response = format_value(json!({"body": {"a": 1}}));
        assert!(response.structured);
        let parsed: Value = response.json_body().unwrap();
        assert_eq!(parsed, json!({"a": 1}));
    }

    #[test]
    fn test_structured_body_keeps_key_order() {
        let response = format_value(json!({"body": {"z": 1, "a": [true, null]}}));
        assert_eq!(response.body, r#"{"z":1,"a":[true,null]}"#);
    }

    #[test]
    fn test_scalar_bodies() {
        assert_eq!(format_value(json!({"body": "hello"})).body, "hello");
        assert_eq!(format_value(json!({"body": 42})).body, "42");
        assert!(!format_value(json!({"body": 42})).structured);
    }

    #[test]
    fn test_null_body_is_not_defaulted() {
        let response = format_value(json!({"body": null}));
        assert_eq!(response.body, "null");
        assert!(!response.structured);
    }

    #[test]
    fn test_mapping_headers_in_order() {
        let response = format_value(json!({"headers": {"X-A": "1", "X-B": "2"}}));
        assert_eq!(
            response.headers,
            vec![
                ("X-A".to_string(), "1".to_string()),
                ("X-B".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_pair_headers_pass_through() {
        let pairs = vec![("X-A".to_string(), "1".to_string())];
        let result = HandlerResult {
            headers: Some(Headers::PairList(pairs.clone())),
            ..Default::default()
        };
        assert_eq!(format_response(Some(&result)).unwrap().headers, pairs);
    }

    #[test]
    fn test_missing_headers_are_empty() {
        assert!(format_value(json!({"body": "x"})).headers.is_empty());
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let result = HandlerResult::new()
            .status(202)
            .json(json!({"k": "v"}).as_object().cloned().unwrap())
            .header_map([("X-A", "1")]);

        let first = format_response(Some(&result)).unwrap();
        let second = format_response(Some(&result)).unwrap();
        assert_eq!(first, second);
    }
}
