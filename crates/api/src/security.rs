//! Access rules for the web app, compiled once at startup.

use formgate_auth::{AccessRuleTable, Requirement, RuleError};

pub const LOGIN_PATH: &str = "/login";
pub const LOGIN_ERROR_PATH: &str = "/login?error";
pub const ACCESS_DENIED_PATH: &str = "/403";
pub const LOGOUT_PATH: &str = "/logout";
pub const HOME_PATH: &str = "/";

/// Ordered, first match wins; anything unlisted is denied.
///
/// `/403` and `/logout` must stay public: the gate redirects denied requests
/// to `/403`, so gating it would loop.
pub fn access_rules() -> Result<AccessRuleTable, RuleError> {
    AccessRuleTable::builder()
        .permit_all(LOGIN_PATH)
        .permit_all(ACCESS_DENIED_PATH)
        .permit_all(LOGOUT_PATH)
        .permit_all("/health")
        .has_role("/admin/**", "admin")
        .authenticated(HOME_PATH)
        .default_requirement(Requirement::DenyAll)
        .build()
}
