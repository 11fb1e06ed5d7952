//! Route handlers.
//!
//! Every page answers with a view name plus a display message; rendering the
//! view is left to the client. Access checks already happened in the gate.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Extension, Form, Json, Router,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use formgate_auth::{AuthSession, Authenticator, CredentialLoader};

use crate::errors::{ApiError, json_error};
use crate::security::{HOME_PATH, LOGIN_ERROR_PATH};

pub type SharedAuthenticator = Arc<Authenticator<Arc<dyn CredentialLoader>>>;

#[derive(Debug, Clone, Serialize)]
pub struct View {
    pub view: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_in_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl View {
    fn new(view: &'static str, message: impl Into<String>) -> Self {
        Self {
            view,
            message: message.into(),
            username: None,
            signed_in_at: None,
            error: false,
        }
    }

    fn for_user(mut self, auth: &AuthSession) -> Self {
        self.username = Some(auth.username.clone());
        self.signed_in_at = Some(auth.authenticated_at);
        self
    }
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/login", get(login_page).post(login))
        .route("/admin", get(admin))
        .route("/403", get(access_denied))
        .route("/logout", get(logout))
        .route("/health", get(health))
        .fallback(not_found)
}

pub async fn home(Extension(auth): Extension<AuthSession>) -> Json<View> {
    Json(View::new("index", "user is logged in").for_user(&auth))
}

pub async fn login_page(Query(params): Query<HashMap<String, String>>) -> Json<View> {
    if params.contains_key("error") {
        let mut view = View::new("login", "invalid credentials");
        view.error = true;
        return Json(view);
    }
    Json(View::new("login", "please sign in"))
}

pub async fn login(
    Extension(authenticator): Extension<SharedAuthenticator>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    match authenticator.authenticate(&form.username, &form.password).await {
        Ok(auth) => {
            // New id on login so a pre-login session id cannot be reused.
            session.cycle_id().await?;
            session.insert(AuthSession::KEY, &auth).await?;
            Ok(Redirect::to(HOME_PATH).into_response())
        }
        Err(e) if e.is_credential_failure() => Ok(Redirect::to(LOGIN_ERROR_PATH).into_response()),
        Err(e) => Err(e.into()),
    }
}

pub async fn admin(Extension(auth): Extension<AuthSession>) -> Json<View> {
    Json(View::new("index", "admin console").for_user(&auth))
}

pub async fn access_denied() -> (StatusCode, Json<View>) {
    (StatusCode::FORBIDDEN, Json(View::new("index", "access denied")))
}

pub async fn logout(session: Session) -> Result<Json<View>, ApiError> {
    if let Ok(Some(auth)) = session.get::<AuthSession>(AuthSession::KEY).await {
        tracing::info!(username = %auth.username, "logout");
    }
    session.flush().await?;
    Ok(Json(View::new("login", "logged out")))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

async fn not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "not_found", "not found")
}
