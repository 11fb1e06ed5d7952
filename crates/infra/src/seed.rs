//! Seed users for the in-memory store.
//!
//! Accounts are created outside the auth flow. For dev/test the API loads
//! them from a JSON file shaped like:
//!
//! ```json
//! [
//!   { "username": "alice", "password": "alice123", "roles": ["admin"] },
//!   { "username": "bob",   "password": "bob123",   "roles": [] }
//! ]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use formgate_auth::{AuthError, Role, User, hash_password};
use formgate_core::{DomainError, UserId};

use crate::InMemoryUserStore;

/// A user as written in seed data, with a raw password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl core::fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SeedUser")
            .field("username", &self.username)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("seed user '{username}': {source}")]
    Password { username: String, source: AuthError },

    #[error("seed user '{username}': {source}")]
    Invalid { username: String, source: DomainError },

    #[error("user store rejected seed batch: {0}")]
    Store(DomainError),
}

pub fn load_seed_file(path: impl AsRef<Path>) -> Result<Vec<SeedUser>, SeedError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Validate and hash every seed user, then insert them in one batch.
///
/// Nothing is inserted unless every seed is valid and no username clashes.
/// Ids continue after the store's current size. Returns the number of users
/// inserted.
pub fn seed_users(store: &InMemoryUserStore, seeds: &[SeedUser]) -> Result<usize, SeedError> {
    let base = store.len().map_err(SeedError::Store)? as i64;

    let mut batch = Vec::with_capacity(seeds.len());
    for (offset, seed) in seeds.iter().enumerate() {
        let hash = hash_password(&seed.password).map_err(|source| SeedError::Password {
            username: seed.username.clone(),
            source,
        })?;

        let user = User::new(
            UserId::new(base + offset as i64 + 1),
            seed.username.clone(),
            hash,
            seed.roles.iter().cloned().map(Role::from),
        )
        .map_err(|source| SeedError::Invalid {
            username: seed.username.clone(),
            source,
        })?;
        batch.push(user);
    }

    store.insert_all(batch).map_err(SeedError::Store)?;
    for seed in seeds {
        tracing::debug!(username = %seed.username, roles = ?seed.roles, "seeded user");
    }
    Ok(seeds.len())
}
