use serde::{Deserialize, Serialize};

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response of `POST /api/auth/login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Body of `POST /api/users` (enrollment).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_id: String,
    pub face_data: String,
}

/// Body carrying a single face image (verify and update).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceDataRequest {
    pub face_data: String,
}

/// Body of `POST /api/faces/compare`.
#[derive(Debug, Clone, Serialize)]
pub struct CompareRequest {
    #[serde(rename = "faceData1")]
    pub face_data1: String,
    #[serde(rename = "faceData2")]
    pub face_data2: String,
}

/// Generic response body shared by the user and face endpoints.
///
/// The service reuses one loosely-shaped object for every endpoint, so
/// every field is optional. Missing and `null` fields both default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
    #[serde(default, rename = "faceData")]
    pub face_data: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, rename = "created_at")]
    pub created_at: Option<String>,
}

/// An enrolled user as shown in the users list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, rename = "userId")]
    pub user_id: String,
    #[serde(default, rename = "created_at")]
    pub created_at: Option<String>,
}

impl From<ApiResponse> for UserRecord {
    fn from(resp: ApiResponse) -> Self {
        Self {
            user_id: resp.user_id.unwrap_or_default(),
            created_at: resp.created_at,
        }
    }
}

/// Result of a verify or compare call that reached the server.
///
/// `verified` is the server's match decision; a completed call with
/// `verified == false` is still a successful round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub verified: bool,
    /// Server-reported confidence in [0, 1].
    pub confidence: f32,
    /// Optional explanation supplied by the server (e.g. "no face found").
    pub error: Option<String>,
}

/// Confidence in [0, 1] rendered as a percentage with two decimals, e.g. `87.00%`.
pub fn confidence_percent(confidence: f32) -> String {
    format!("{:.2}%", confidence * 100.0)
}

impl From<ApiResponse> for MatchResult {
    fn from(resp: ApiResponse) -> Self {
        Self {
            verified: resp.verified.unwrap_or_default(),
            confidence: resp.confidence.unwrap_or_default(),
            error: resp.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_list_deserializes_extra_fields() {
        let body = r#"[
            {"_id": "a1", "userId": "u1", "created_at": "2024-01-15T10:30:00.123Z", "faceData": "x"},
            {"userId": "u2"}
        ]"#;
        let users: Vec<ApiResponse> = serde_json::from_str(body).unwrap();
        let users: Vec<UserRecord> = users.into_iter().map(UserRecord::from).collect();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].user_id, "u1");
        assert_eq!(users[0].created_at.as_deref(), Some("2024-01-15T10:30:00.123Z"));
        assert_eq!(users[1].created_at, None);
    }

    #[test]
    fn test_match_result_from_verify_body() {
        let resp: ApiResponse =
            serde_json::from_str(r#"{"verified": true, "confidence": 0.87}"#).unwrap();
        let result = MatchResult::from(resp);
        assert!(result.verified);
        assert_eq!(result.error, None);
        assert_eq!(confidence_percent(result.confidence), "87.00%");
    }

    #[test]
    fn test_match_result_defaults_when_fields_missing() {
        let resp: ApiResponse = serde_json::from_str(r#"{"error": "no face"}"#).unwrap();
        let result = MatchResult::from(resp);
        assert!(!result.verified);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.error.as_deref(), Some("no face"));
    }

    #[test]
    fn test_match_result_null_fields_default() {
        let resp: ApiResponse = serde_json::from_str(
            r#"{"verified": null, "confidence": null, "error": "No face detected"}"#,
        )
        .unwrap();
        let result = MatchResult::from(resp);
        assert!(!result.verified);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.error.as_deref(), Some("No face detected"));
    }

    #[test]
    fn test_request_field_names() {
        let register = serde_json::to_value(RegisterRequest {
            user_id: "u1".into(),
            face_data: "data".into(),
        })
        .unwrap();
        assert_eq!(register["userId"], "u1");
        assert_eq!(register["faceData"], "data");

        let compare = serde_json::to_value(CompareRequest {
            face_data1: "a".into(),
            face_data2: "b".into(),
        })
        .unwrap();
        assert_eq!(compare["faceData1"], "a");
        assert_eq!(compare["faceData2"], "b");
    }
}
