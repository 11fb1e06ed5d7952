//! `formgate-auth` — form-login authentication and path-based authorization.
//!
//! This crate is intentionally decoupled from HTTP and storage: user records
//! come in through [`CredentialLoader`], and the gate only ever sees a path
//! string and an optional [`AuthSession`].

pub mod authenticate;
pub mod authorize;
pub mod credentials;
pub mod error;
pub mod password;
pub mod roles;
pub mod rules;
pub mod session;
pub mod user;

pub use authenticate::Authenticator;
pub use authorize::{Decision, authorize};
pub use credentials::{CredentialLoader, lookup};
pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use roles::Role;
pub use rules::{
    AccessRule, AccessRuleTable, AccessRuleTableBuilder, PathPattern, Requirement, RuleError,
};
pub use session::AuthSession;
pub use user::User;
