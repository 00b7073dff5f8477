//! Response envelope handling.
//!
//! The API may answer either with the payload itself or with the payload
//! wrapped one level deep as `{"data": ...}`. Errors carry a `message` field.

use serde_json::Value;

/// Returns the `data` member when present and non-null, else the value itself.
pub fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) if !data.is_null() => data,
            Some(_) | None => Value::Object(map),
        },
        other => other,
    }
}

/// Verify answers with the profile directly or as `{"user": {...}}`.
pub fn unwrap_user(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("user").is_some_and(Value::is_object) => {
            map.remove("user").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Extracts a human-readable error message from a failure body.
///
/// Looks at `message`, then `error`, on the body and on its `data` member;
/// falls back to `Request failed: <status>`.
pub fn error_message(body: &Value, status: u16) -> String {
    let candidates = [
        body.get("message"),
        body.get("error"),
        body.get("data").and_then(|d| d.get("message")),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed: {}", status))
}

/// Parses a raw body; an empty or non-JSON body becomes `Value::Null`.
pub fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_data_prefers_data() {
        let wrapped = json!({"data": {"accessToken": "at"}, "success": true});
        assert_eq!(unwrap_data(wrapped), json!({"accessToken": "at"}));
    }

    #[test]
    fn test_unwrap_data_passes_through_bare_payload() {
        let bare = json!({"accessToken": "at"});
        assert_eq!(unwrap_data(bare.clone()), bare);
    }

    #[test]
    fn test_unwrap_data_ignores_null_data() {
        let value = json!({"data": null, "accessToken": "at"});
        assert_eq!(unwrap_data(value), json!({"accessToken": "at"}));
    }

    #[test]
    fn test_unwrap_user() {
        let nested = json!({"user": {"id": "1"}});
        assert_eq!(unwrap_user(nested), json!({"id": "1"}));

        let direct = json!({"id": "1", "username": "alice"});
        assert_eq!(unwrap_user(direct.clone()), direct);
    }

    #[test]
    fn test_error_message_sources() {
        assert_eq!(error_message(&json!({"message": "Bad password"}), 401), "Bad password");
        assert_eq!(error_message(&json!({"error": "Locked"}), 423), "Locked");
        assert_eq!(
            error_message(&json!({"data": {"message": "Nested"}}), 400),
            "Nested"
        );
        assert_eq!(error_message(&Value::Null, 502), "Request failed: 502");
        assert_eq!(error_message(&json!({"message": ""}), 500), "Request failed: 500");
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("<html>oops</html>"), Value::Null);
        assert_eq!(parse_body("{\"a\":1}"), json!({"a": 1}));
    }
}
