//! Application wiring: user store, authenticator, sessions, gate, routes.

use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use formgate_auth::{Authenticator, CredentialLoader};
use formgate_infra::{
    InMemoryUserStore, PostgresUserStore, SeedUser, load_seed_file, seed_users,
};

use crate::config::{AppConfig, SessionSettings};
use crate::middleware::{self, GateState};
use crate::routes::{self, SharedAuthenticator};
use crate::security;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let loader: Arc<dyn CredentialLoader> = match &config.database_url {
        Some(url) => {
            tracing::info!("using postgres user store");
            Arc::new(
                PostgresUserStore::connect(url)
                    .await
                    .context("failed to connect to DATABASE_URL")?,
            )
        }
        None => Arc::new(in_memory_store(config)?),
    };

    build_router(loader, &config.sessions)
}

/// Router over an arbitrary user store (tests use this directly).
pub fn build_router(
    loader: Arc<dyn CredentialLoader>,
    sessions: &SessionSettings,
) -> anyhow::Result<Router> {
    let rules = Arc::new(security::access_rules().context("invalid access rules")?);
    let authenticator: SharedAuthenticator = Arc::new(Authenticator::new(loader)?);

    let idle_secs = i64::try_from(sessions.idle_timeout.as_secs()).unwrap_or(i64::MAX);
    let idle = time::Duration::seconds(idle_secs);
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(sessions.secure_cookie)
        .with_expiry(Expiry::OnInactivity(idle));

    // Outermost first: trace, session, gate, then handlers.
    Ok(routes::router()
        .layer(Extension(authenticator))
        .layer(axum::middleware::from_fn_with_state(
            GateState { rules },
            middleware::authorization_gate,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(session_layer),
        ))
}

fn in_memory_store(config: &AppConfig) -> anyhow::Result<InMemoryUserStore> {
    let seeds = match &config.seed_file {
        Some(path) => load_seed_file(path)
            .with_context(|| format!("failed to load seed file {}", path.display()))?,
        None => {
            tracing::warn!("FORMGATE_SEED_FILE not set; seeding insecure dev users");
            dev_seed_users()
        }
    };

    let store = InMemoryUserStore::new();
    let count = seed_users(&store, &seeds)?;
    tracing::info!(users = count, "in-memory user store ready");
    Ok(store)
}

/// `alice` (admin) and `bob` (no roles).
pub fn dev_seed_users() -> Vec<SeedUser> {
    vec![
        SeedUser {
            username: "alice".to_string(),
            password: "alice123".to_string(),
            roles: vec!["admin".to_string()],
        },
        SeedUser {
            username: "bob".to_string(),
            password: "bob123".to_string(),
            roles: vec![],
        },
    ]
}
