//! Authorization gate: runs the access rule table before any handler.

use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use formgate_auth::{AccessRuleTable, AuthError, AuthSession, Decision, authorize};

use crate::security::{ACCESS_DENIED_PATH, LOGIN_PATH};

#[derive(Clone)]
pub struct GateState {
    pub rules: Arc<AccessRuleTable>,
}

/// Evaluate the rule table against the literal request path.
///
/// On `Allow` the caller's [`AuthSession`] (if any) is placed in the request
/// extensions for handlers to read.
pub async fn authorization_gate(
    State(state): State<GateState>,
    session: Session,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let current = current_auth(&session).await;
    let path = req.uri().path().to_owned();
    let decision = authorize(&state.rules, &path, current.as_ref());

    tracing::debug!(
        path = %path,
        user = current.as_ref().map(|s| s.username.as_str()),
        decision = decision.as_str(),
        "authorization gate"
    );

    match decision {
        Decision::Allow => {
            if let Some(auth) = current {
                req.extensions_mut().insert(auth);
            }
            next.run(req).await
        }
        Decision::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
        Decision::Deny => {
            tracing::info!(
                path = %path,
                user = current.as_ref().map(|s| s.username.as_str()),
                error = %AuthError::AccessDenied,
                "request denied"
            );
            Redirect::to(ACCESS_DENIED_PATH).into_response()
        }
    }
}

/// Read the authenticated identity from the session.
///
/// A payload that no longer decodes is treated as an expired session: it is
/// discarded and the request continues unauthenticated.
async fn current_auth(session: &Session) -> Option<AuthSession> {
    match session.get::<AuthSession>(AuthSession::KEY).await {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!(error = %e, "{}; discarding session", AuthError::SessionExpired);
            if let Err(e) = session.flush().await {
                tracing::error!(error = %e, "failed to flush session");
            }
            None
        }
    }
}
