//! User record as read from the user store.
//!
//! `User` is plain data. It does not know about sessions or HTTP; the mapping
//! to an authenticated context lives in [`crate::AuthSession::from_user`].

use std::collections::BTreeSet;

use formgate_core::{DomainError, DomainResult, UserId};

use crate::Role;

pub const USERNAME_MIN_CHARS: usize = 2;
pub const USERNAME_MAX_CHARS: usize = 20;

/// A registered user: login name, stored password hash, and granted roles.
///
/// # Invariants
/// - `username` is 2..=20 characters.
/// - `password_hash` is non-empty (a PHC string produced by [`crate::hash_password`]).
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
}

impl User {
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> DomainResult<Self> {
        let username = username.into();
        validate_username(&username)?;

        let password_hash = password_hash.into();
        if password_hash.is_empty() {
            return Err(DomainError::validation("password hash must not be empty"));
        }

        Ok(Self {
            id,
            username,
            password_hash,
            roles: roles.into_iter().collect(),
        })
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.as_str() == role)
    }
}

// The hash stays out of logs.
impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

pub fn validate_username(username: &str) -> DomainResult<()> {
    let len = username.chars().count();
    if len == 0 {
        return Err(DomainError::validation("username must not be empty"));
    }
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&len) {
        return Err(DomainError::validation(format!(
            "username must be {USERNAME_MIN_CHARS}-{USERNAME_MAX_CHARS} characters, got {len}"
        )));
    }
    Ok(())
}
