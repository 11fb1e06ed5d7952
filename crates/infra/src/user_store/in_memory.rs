use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use formgate_auth::{AuthError, CredentialLoader, Role, User};
use formgate_core::{DomainError, DomainResult, RoleId};

use super::Authority;

/// In-memory user store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
    authorities: RwLock<BTreeMap<Role, RoleId>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user. Usernames are unique.
    ///
    /// Each role the user holds gets an authority row the first time it is seen.
    pub fn insert(&self, user: User) -> DomainResult<()> {
        self.insert_all(vec![user])
    }

    /// Add several users, all or nothing.
    ///
    /// Every username is checked against the store and the rest of the batch
    /// before any user is written.
    pub fn insert_all(&self, batch: Vec<User>) -> DomainResult<()> {
        let mut users = self.users.write().map_err(|_| poisoned())?;

        let mut seen = HashSet::new();
        for user in &batch {
            if users.contains_key(&user.username) || !seen.insert(user.username.as_str()) {
                return Err(DomainError::validation(format!(
                    "username '{}' already exists",
                    user.username
                )));
            }
        }

        let mut authorities = self.authorities.write().map_err(|_| poisoned())?;
        for user in batch {
            for role in &user.roles {
                let next = RoleId::new(authorities.len() as i64 + 1);
                authorities.entry(role.clone()).or_insert(next);
            }
            users.insert(user.username.clone(), user);
        }
        Ok(())
    }

    pub fn len(&self) -> DomainResult<usize> {
        self.users.read().map(|m| m.len()).map_err(|_| poisoned())
    }

    pub fn is_empty(&self) -> DomainResult<bool> {
        Ok(self.len()? == 0)
    }

    /// All known roles, ordered by id.
    pub fn authorities(&self) -> Vec<Authority> {
        let map = match self.authorities.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };

        let mut out: Vec<Authority> = map
            .iter()
            .map(|(name, id)| Authority {
                id: *id,
                name: name.clone(),
            })
            .collect();
        out.sort_by_key(|a| a.id);
        out
    }
}

fn poisoned() -> DomainError {
    DomainError::validation("user store lock poisoned")
}

#[async_trait]
impl CredentialLoader for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let users = self
            .users
            .read()
            .map_err(|_| AuthError::Store("user store lock poisoned".to_string()))?;
        Ok(users.get(username).cloned())
    }
}
