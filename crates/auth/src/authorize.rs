use crate::{AccessRuleTable, AuthSession, Requirement};

/// Outcome of gating one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// No session, and the path needs one.
    RedirectToLogin,
    /// Send to the access-denied page.
    Deny,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::RedirectToLogin => "redirect_to_login",
            Decision::Deny => "deny",
        }
    }
}

/// Decide whether a request for `path` may proceed.
///
/// - No IO
/// - No panics
/// - `path` is the literal request path, without the query string
pub fn authorize(table: &AccessRuleTable, path: &str, session: Option<&AuthSession>) -> Decision {
    match (table.requirement_for(path), session) {
        (Requirement::Public, _) => Decision::Allow,
        (Requirement::Authenticated, Some(_)) => Decision::Allow,
        (Requirement::Authenticated, None) => Decision::RedirectToLogin,
        (Requirement::Role(role), Some(s)) if s.has_role(role) => Decision::Allow,
        (Requirement::Role(_), _) => Decision::Deny,
        (Requirement::DenyAll, _) => Decision::Deny,
    }
}
