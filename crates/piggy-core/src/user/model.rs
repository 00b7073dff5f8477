//! UserProfile domain model.
//!
//! Represents the authenticated user as returned by the remote API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// User profile domain model.
///
/// The profile is owned by the session and is always replaced wholesale
/// (login, register, verify, `update_user`), never patched field by field.
///
/// The wire and persisted form is camelCase JSON:
///
/// ```json
/// { "id": "42", "username": "alice", "email": "alice@example.com", "createdAt": "2024-01-01T00:00:00Z" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Remote identifier. Numeric ids are normalized to their string form.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Parses a profile from its serialized JSON form.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the profile for storage under the USER key.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> UserProfile {
        UserProfile {
            id: "u-1".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("created_at"));
    }

    #[test]
    fn test_round_trip_through_json() {
        let profile = sample();
        let parsed = UserProfile::from_json(&profile.to_json().unwrap()).unwrap();
        assert_eq!(parsed, profile);
    }

    #[test]
    fn test_numeric_id_is_normalized() {
        let json = r#"{"id": 42, "username": "bob", "email": "bob@example.com", "createdAt": "2024-01-01T00:00:00Z"}"#;
        let profile = UserProfile::from_json(json).unwrap();
        assert_eq!(profile.id, "42");
    }

    #[test]
    fn test_corrupted_json_is_an_error() {
        let result = UserProfile::from_json("{\"id\": \"1\", \"username\": ");
        assert!(result.is_err());
        assert!(result.unwrap_err().is_serialization());
    }
}
