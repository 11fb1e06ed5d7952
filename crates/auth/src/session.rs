use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use formgate_core::UserId;

use crate::{Role, User};

/// Authenticated identity carried by a server-side session.
///
/// Created once on successful login; the gate reads it on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: UserId,
    pub username: String,
    pub roles: BTreeSet<Role>,
    pub authenticated_at: DateTime<Utc>,
}

impl AuthSession {
    /// Session key the HTTP layer stores this value under.
    pub const KEY: &'static str = "auth";

    pub fn from_user(user: &User) -> Self {
        Self::from_user_at(user, Utc::now())
    }

    pub fn from_user_at(user: &User, at: DateTime<Utc>) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            roles: user.roles.clone(),
            authenticated_at: at,
        }
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}
