//! Credential loading: the seam between the auth flow and the user store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{AuthError, User};

/// Source of user records keyed by login name.
///
/// Implementations match `username` exactly (case-sensitive) and have no side
/// effects. `Ok(None)` means no such user; `Err` is reserved for store failures.
#[async_trait]
pub trait CredentialLoader: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;
}

#[async_trait]
impl<L> CredentialLoader for Arc<L>
where
    L: CredentialLoader + ?Sized,
{
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        (**self).find_by_username(username).await
    }
}

/// Load a user or fail with [`AuthError::UserNotFound`].
pub async fn lookup<L>(loader: &L, username: &str) -> Result<User, AuthError>
where
    L: CredentialLoader + ?Sized,
{
    loader
        .find_by_username(username)
        .await?
        .ok_or(AuthError::UserNotFound)
}
