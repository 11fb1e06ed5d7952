use thiserror::Error;

/// Failures of the authentication flow and the authorization gate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("user not found")]
    UserNotFound,

    #[error("credential mismatch")]
    CredentialMismatch,

    #[error("access denied")]
    AccessDenied,

    #[error("session expired")]
    SessionExpired,

    #[error("invalid password: {0}")]
    InvalidPassword(String),

    #[error("password hash error: {0}")]
    Hash(String),

    #[error("user store error: {0}")]
    Store(String),
}

impl AuthError {
    /// `true` for the two outcomes of a bad login attempt.
    pub fn is_credential_failure(&self) -> bool {
        matches!(self, AuthError::UserNotFound | AuthError::CredentialMismatch)
    }

    /// Message safe to show to the client.
    ///
    /// Unknown usernames and wrong passwords collapse into the same text so
    /// the login form cannot be used to probe which accounts exist.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::UserNotFound | AuthError::CredentialMismatch => "invalid credentials",
            AuthError::AccessDenied => "access denied",
            AuthError::SessionExpired => "session expired",
            AuthError::InvalidPassword(_) => "invalid password",
            AuthError::Hash(_) | AuthError::Store(_) => "internal error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failures_share_public_message() {
        assert_eq!(
            AuthError::UserNotFound.public_message(),
            AuthError::CredentialMismatch.public_message()
        );
        assert!(AuthError::UserNotFound.is_credential_failure());
        assert!(!AuthError::Store("down".into()).is_credential_failure());
    }
}
