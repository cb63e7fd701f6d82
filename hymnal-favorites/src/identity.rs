//! Identity regime of the current visitor

use std::fmt;

/// Who the favorites belong to
///
/// Fixed for the lifetime of a reconciler; a login or logout means building
/// a new one.
#[derive(Clone, PartialEq, Eq)]
pub enum IdentityMode {
    /// Favorites live in local storage on this device
    Anonymous,
    /// Favorites live on the service, keyed by the session's account
    Authenticated { session_token: String },
}

impl IdentityMode {
    /// Authenticated when a non-blank token is present
    pub fn from_token(token: Option<String>) -> Self {
        match token.map(|t| t.trim().to_string()) {
            Some(session_token) if !session_token.is_empty() => {
                IdentityMode::Authenticated { session_token }
            }
            _ => IdentityMode::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, IdentityMode::Authenticated { .. })
    }

    pub fn session_token(&self) -> Option<&str> {
        match self {
            IdentityMode::Anonymous => None,
            IdentityMode::Authenticated { session_token } => Some(session_token),
        }
    }
}

// Tokens must not end up in logs
impl fmt::Debug for IdentityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityMode::Anonymous => f.write_str("Anonymous"),
            IdentityMode::Authenticated { .. } => f.write_str("Authenticated { session_token: <redacted> }"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_is_anonymous() {
        assert_eq!(IdentityMode::from_token(None), IdentityMode::Anonymous);
        assert_eq!(IdentityMode::from_token(Some("  ".into())), IdentityMode::Anonymous);
    }

    #[test]
    fn test_token_is_authenticated() {
        let mode = IdentityMode::from_token(Some(" abc ".into()));
        assert!(mode.is_authenticated());
        assert_eq!(mode.session_token(), Some("abc"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let mode = IdentityMode::from_token(Some("secret-token".into()));
        assert!(!format!("{:?}", mode).contains("secret-token"));
    }
}
