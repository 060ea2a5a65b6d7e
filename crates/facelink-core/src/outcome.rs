//! Uniform outcome record and the title/message pairs screens render.
//!
//! Typed results from the client are folded into an [`Outcome`] at the UI
//! boundary, and every presentation string is produced here.

use crate::error::ApiError;
use crate::types::{confidence_percent, MatchResult, UserRecord};

/// Fallback message for a completed verify/compare that did not match.
pub const NO_MATCH_MESSAGE: &str = "Faces do not match";

/// A user-initiated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Login,
    Register,
    Verify,
    Update,
    Compare,
    ListUsers,
    FetchImage,
    Delete,
}

impl Action {
    /// Context prepended to transport failures, e.g. "Registration error: timed out".
    pub fn transport_context(self) -> &'static str {
        match self {
            Action::Login => "Authentication error",
            Action::Register => "Registration error",
            Action::Verify => "Verification error",
            Action::Update => "Update error",
            Action::Compare => "Comparison error",
            Action::ListUsers => "Error getting users",
            Action::FetchImage => "Error getting user image",
            Action::Delete => "Error deleting user",
        }
    }

    /// Title shown above a failure message.
    pub fn failure_title(self) -> &'static str {
        match self {
            Action::Login => "Authentication Failed",
            Action::Register => "Registration Failed",
            Action::Verify => "Verification Failed",
            Action::Update => "Update Failed",
            Action::Compare => "Comparison Failed",
            Action::ListUsers => "Failed to load users",
            Action::FetchImage => "Error",
            Action::Delete => "Failed to delete user",
        }
    }

    /// Full user-facing text for an error raised by this action.
    pub fn error_message(self, err: &ApiError) -> String {
        match err {
            ApiError::Transport { cause } => format!("{}: {cause}", self.transport_context()),
            other => other.to_string(),
        }
    }
}

/// The success/error/payload record every operation produces.
///
/// Either `error` is meaningful or the success payload is; `confidence`,
/// `face_data` and `users` are only set by the calls that produce them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub success: bool,
    pub user_id: Option<String>,
    pub error: Option<String>,
    /// In [0, 1].
    pub confidence: Option<f32>,
    /// Data-URI encoded face image.
    pub face_data: Option<String>,
    pub users: Option<Vec<UserRecord>>,
}

impl Outcome {
    pub fn failure(action: Action, user_id: Option<&str>, err: &ApiError) -> Self {
        Self {
            success: false,
            user_id: user_id.map(str::to_string),
            error: Some(action.error_message(err)),
            ..Default::default()
        }
    }

    /// Outcome of a call whose only payload is "it worked".
    pub fn from_unit(action: Action, user_id: Option<&str>, result: Result<(), ApiError>) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                user_id: user_id.map(str::to_string),
                ..Default::default()
            },
            Err(e) => Self::failure(action, user_id, &e),
        }
    }

    /// Outcome of verify/compare.
    ///
    /// `success` mirrors the server's match decision, so a completed call
    /// that did not match is reported as a failure carrying the server's
    /// explanation.
    pub fn from_match(
        action: Action,
        user_id: Option<&str>,
        result: Result<MatchResult, ApiError>,
    ) -> Self {
        match result {
            Ok(m) => Self {
                success: m.verified,
                user_id: user_id.map(str::to_string),
                confidence: Some(m.confidence),
                error: if m.verified {
                    None
                } else {
                    Some(m.error.unwrap_or_else(|| NO_MATCH_MESSAGE.to_string()))
                },
                ..Default::default()
            },
            Err(e) => Self::failure(action, user_id, &e),
        }
    }

    pub fn from_users(result: Result<Vec<UserRecord>, ApiError>) -> Self {
        match result {
            Ok(users) => Self {
                success: true,
                users: Some(users),
                ..Default::default()
            },
            Err(e) => Self::failure(Action::ListUsers, None, &e),
        }
    }

    pub fn from_image(user_id: &str, result: Result<String, ApiError>) -> Self {
        match result {
            Ok(face_data) => Self {
                success: true,
                user_id: Some(user_id.to_string()),
                face_data: Some(face_data),
                ..Default::default()
            },
            Err(e) => Self::failure(Action::FetchImage, Some(user_id), &e),
        }
    }

    /// Render this outcome as the title/message pair for `action`.
    pub fn present(&self, action: Action) -> Presentation {
        if !self.success {
            let message = match action {
                Action::Login => "Invalid username or password".to_string(),
                _ => self.error.clone().unwrap_or_else(|| "Unknown error".to_string()),
            };
            return Presentation::error(action.failure_title(), message);
        }

        let confidence = self.confidence.unwrap_or_default();
        match action {
            Action::Login => Presentation::info("Settings", "Credentials saved successfully"),
            Action::Register => Presentation::info("Register", "Registration successful!"),
            Action::Update => Presentation::info("Update", "User updated successfully!"),
            Action::Verify => Presentation::info(
                "Verify",
                format!("Verification successful!\nConfidence: {}", confidence_percent(confidence)),
            ),
            Action::Compare => Presentation::info(
                "Compare",
                format!("Faces match!\nConfidence: {}", confidence_percent(confidence)),
            ),
            Action::Delete => Presentation::info("Users", "User deleted successfully"),
            Action::ListUsers => {
                let count = self.users.as_ref().map_or(0, Vec::len);
                if count == 0 {
                    Presentation::info("Users", "No users found")
                } else {
                    Presentation::info("Users", format!("{count} user(s)"))
                }
            }
            Action::FetchImage => Presentation::info(
                "User Image",
                format!("Image retrieved for {}", self.user_id.as_deref().unwrap_or("user")),
            ),
        }
    }
}

/// A title/message pair ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub title: String,
    pub message: String,
    pub is_error: bool,
}

impl Presentation {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            is_error: true,
        }
    }
}

impl std::fmt::Display for Presentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_success_shows_percentage() {
        let outcome = Outcome::from_match(
            Action::Verify,
            Some("u1"),
            Ok(MatchResult { verified: true, confidence: 0.87, error: None }),
        );
        assert!(outcome.success);
        let p = outcome.present(Action::Verify);
        assert!(!p.is_error);
        assert!(p.message.contains("87.00%"), "got {}", p.message);
    }

    #[test]
    fn test_compare_no_match_uses_server_error() {
        let outcome = Outcome::from_match(
            Action::Compare,
            None,
            Ok(MatchResult { verified: false, confidence: 0.12, error: Some("low similarity".into()) }),
        );
        assert!(!outcome.success);
        assert_eq!(outcome.confidence, Some(0.12));
        let p = outcome.present(Action::Compare);
        assert_eq!(p, Presentation::error("Comparison Failed", "low similarity"));
    }

    #[test]
    fn test_no_match_without_server_error_uses_fallback() {
        let outcome = Outcome::from_match(
            Action::Verify,
            Some("u1"),
            Ok(MatchResult { verified: false, confidence: 0.0, error: None }),
        );
        assert_eq!(outcome.error.as_deref(), Some(NO_MATCH_MESSAGE));
    }

    #[test]
    fn test_not_authenticated_message() {
        let outcome = Outcome::from_unit(Action::Register, Some("u1"), Err(ApiError::NotAuthenticated));
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Not authenticated"));
        assert_eq!(outcome.present(Action::Register).title, "Registration Failed");
    }

    #[test]
    fn test_transport_error_gets_action_context() {
        let outcome = Outcome::from_unit(
            Action::Delete,
            Some("u1"),
            Err(ApiError::transport("connection refused")),
        );
        assert_eq!(outcome.error.as_deref(), Some("Error deleting user: connection refused"));
    }

    #[test]
    fn test_status_errors_are_not_prefixed() {
        let outcome = Outcome::from_unit(Action::Register, Some("u1"), Err(ApiError::from_status(409, "{}")));
        assert_eq!(outcome.error.as_deref(), Some("User already exists"));
    }

    #[test]
    fn test_login_failure_hides_detail() {
        let outcome = Outcome::from_unit(Action::Login, None, Err(ApiError::AuthFailed));
        assert_eq!(outcome.error.as_deref(), Some("Authentication failed"));
        let p = outcome.present(Action::Login);
        assert_eq!(p, Presentation::error("Authentication Failed", "Invalid username or password"));
    }

    #[test]
    fn test_users_outcome_and_empty_state() {
        let outcome = Outcome::from_users(Ok(vec![]));
        assert!(outcome.success);
        assert_eq!(outcome.present(Action::ListUsers).message, "No users found");

        let outcome = Outcome::from_users(Ok(vec![UserRecord { user_id: "u1".into(), created_at: None }]));
        assert_eq!(outcome.users.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_image_outcome_carries_face_data() {
        let outcome = Outcome::from_image("u1", Ok("data:image/jpeg;base64,QUJD".into()));
        assert_eq!(outcome.face_data.as_deref(), Some("data:image/jpeg;base64,QUJD"));
        assert_eq!(outcome.user_id.as_deref(), Some("u1"));
    }
}
