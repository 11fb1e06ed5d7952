//! User store backends implementing [`formgate_auth::CredentialLoader`].
//!
//! The store is read-only from the auth flow's point of view: it only ever
//! asks for one user by exact username.

pub mod in_memory;
pub mod postgres;

use serde::{Deserialize, Serialize};

use formgate_auth::Role;
use formgate_core::RoleId;

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;

/// A persisted role row (`authority` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    pub id: RoleId,
    pub name: Role,
}
