//! Form-login authentication flow.
//!
//! username/password → credential lookup → Argon2 verification → [`AuthSession`].

use crate::{AuthError, AuthSession, CredentialLoader, hash_password, lookup, verify_password};

/// Verifies submitted credentials against a [`CredentialLoader`].
pub struct Authenticator<L> {
    loader: L,
    // Verified against when the username is unknown, so a miss costs about
    // as much as a wrong password.
    decoy_hash: String,
}

impl<L> Authenticator<L>
where
    L: CredentialLoader,
{
    pub fn new(loader: L) -> Result<Self, AuthError> {
        let decoy_hash = hash_password("decoy-password")?;
        Ok(Self { loader, decoy_hash })
    }

    /// Authenticate a login attempt.
    ///
    /// Returns [`AuthError::UserNotFound`] or [`AuthError::CredentialMismatch`]
    /// on a bad attempt; callers must surface both the same way
    /// (see [`AuthError::public_message`]). There is no lockout or backoff.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let user = match lookup(&self.loader, username).await {
            Ok(user) => user,
            Err(AuthError::UserNotFound) => {
                let _ = verify_password(password, &self.decoy_hash);
                tracing::warn!(username, reason = "unknown_user", "login rejected");
                return Err(AuthError::UserNotFound);
            }
            Err(e) => {
                tracing::error!(username, error = %e, "credential lookup failed");
                return Err(e);
            }
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::warn!(username, reason = "bad_password", "login rejected");
            return Err(AuthError::CredentialMismatch);
        }

        let session = AuthSession::from_user(&user);
        tracing::info!(
            username,
            user_id = %user.id,
            roles = ?session.roles,
            "login accepted"
        );
        Ok(session)
    }
}
