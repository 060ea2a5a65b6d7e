//! Bearer-token session shared by every authenticated call.

use std::sync::{PoisonError, RwLock};

/// Number of token characters that may appear in logs.
const LOGGED_TOKEN_PREFIX: usize = 10;

/// Holds the current bearer token.
///
/// Created once and shared (`Arc<Session>`) with the client. Setting a
/// token overwrites any previous one; there is no expiry and no logout.
#[derive(Debug, Default)]
pub struct Session {
    token: RwLock<Option<String>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current token unconditionally.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        tracing::debug!(token = %redact(&token), "session token set");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True if a non-empty token is held. Whitespace is not trimmed and
    /// the token is not checked against the server.
    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }
}

fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(LOGGED_TOKEN_PREFIX).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_before_login() {
        let session = Session::new();
        assert!(!session.has_token());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_set_token() {
        let session = Session::new();
        session.set_token("abc");
        assert!(session.has_token());
        assert_eq!(session.token().as_deref(), Some("abc"));
    }

    #[test]
    fn test_whitespace_token_counts() {
        let session = Session::new();
        session.set_token("   ");
        assert!(session.has_token());
    }

    #[test]
    fn test_empty_token_does_not_count() {
        let session = Session::new();
        session.set_token("");
        assert!(!session.has_token());
    }

    #[test]
    fn test_overwrite() {
        let session = Session::new();
        session.set_token("first");
        session.set_token("second");
        assert_eq!(session.token().as_deref(), Some("second"));
    }

    #[test]
    fn test_redact_short_token() {
        assert_eq!(redact("abc"), "abc...");
        assert_eq!(redact("0123456789abcdef"), "0123456789...");
    }
}
