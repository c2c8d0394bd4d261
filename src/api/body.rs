use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
};
use serde_json::{Map, Value};

use super::ApiError;

/// A request body normalized to one JSON object.
///
/// Callers post either `application/json` or `text/plain` carrying JSON;
/// both end up here before any handler logic runs. An empty body counts as
/// an empty object, so the field checks decide what happens next.
#[derive(Debug, Clone, Default)]
pub struct RequestBody(Map<String, Value>);

impl RequestBody {
    pub fn parse(content_type: Option<&str>, bytes: &[u8]) -> Result<Self, ApiError> {
        if let Some(content_type) = content_type {
            if !is_accepted(content_type) {
                return Err(ApiError::MalformedBody(format!(
                    "unsupported content type: {content_type}"
                )));
            }
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(other) => Err(ApiError::MalformedBody(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            ))),
            Err(e) => Err(ApiError::MalformedBody(e.to_string())),
        }
    }

    /// A non-empty string field. Missing, empty and non-string values are all
    /// `None`.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// The non-empty strings of an array field; anything else is skipped.
    pub fn str_list(&self, name: &str) -> Vec<&str> {
        match self.0.get(name) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl<S> FromRequest<S> for RequestBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::MalformedBody(e.body_text()))?;

        Self::parse(content_type.as_deref(), &bytes)
    }
}

fn is_accepted(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json") || essence == "text/plain"
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_and_plain_text_are_equivalent() {
        let raw = br#"{"receiver":"room1","content":"hi","api_key":"K"}"#;
        let json = RequestBody::parse(Some("application/json"), raw).unwrap();
        let text = RequestBody::parse(Some("text/plain; charset=utf-8"), raw).unwrap();
        assert_eq!(json.str_field("content"), Some("hi"));
        assert_eq!(text.str_field("content"), Some("hi"));
        assert_eq!(json.str_field("receiver"), text.str_field("receiver"));
    }

    #[test]
    fn test_missing_content_type_is_accepted() {
        let body = RequestBody::parse(None, br#"{"receiver":"u1"}"#).unwrap();
        assert_eq!(body.str_field("receiver"), Some("u1"));
    }

    #[test]
    fn test_malformed_plain_text() {
        let err = RequestBody::parse(Some("text/plain"), b"{not json").unwrap_err();
        assert!(matches!(err, ApiError::MalformedBody(_)));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = RequestBody::parse(Some("application/json"), b"[1,2]").unwrap_err();
        let ApiError::MalformedBody(detail) = err else {
            panic!("expected MalformedBody");
        };
        assert!(detail.contains("an array"));
    }

    #[test]
    fn test_unsupported_content_type() {
        let err = RequestBody::parse(Some("application/x-www-form-urlencoded"), b"a=b")
            .unwrap_err();
        assert!(matches!(err, ApiError::MalformedBody(_)));
    }

    #[test]
    fn test_empty_body_is_empty_object() {
        let body = RequestBody::parse(Some("application/json"), b"  \n").unwrap();
        assert_eq!(body.str_field("api_key"), None);
    }

    #[test]
    fn test_str_field_treats_empty_and_non_string_as_missing() {
        let body = RequestBody::parse(
            None,
            br#"{"a":"","b":42,"c":null,"d":"ok"}"#,
        )
        .unwrap();
        assert_eq!(body.str_field("a"), None);
        assert_eq!(body.str_field("b"), None);
        assert_eq!(body.str_field("c"), None);
        assert_eq!(body.str_field("d"), Some("ok"));
        assert_eq!(body.str_field("missing"), None);
    }

    #[test]
    fn test_str_list_skips_non_strings() {
        let body =
            RequestBody::parse(None, br#"{"at_list":["wxid_a",7,"","wxid_b"],"x":"y"}"#).unwrap();
        assert_eq!(body.str_list("at_list"), vec!["wxid_a", "wxid_b"]);
        assert!(body.str_list("x").is_empty());
        assert!(body.str_list("missing").is_empty());
    }
}
