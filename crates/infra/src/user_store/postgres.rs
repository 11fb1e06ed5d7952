//! Postgres-backed user store.
//!
//! Reads the `"user"`, `authority` and `user_authority(user_id, authority_id)`
//! tables. Creating and migrating the schema is out of scope; the store only
//! issues reads.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use formgate_auth::{AuthError, CredentialLoader, Role, User};
use formgate_core::UserId;

// One round trip: the user row joined with every authority it holds.
// A user without roles comes back as a single row with NULL authority columns.
const FIND_BY_USERNAME: &str = r#"
SELECT u.id, u.username, u.password, a.id AS authority_id, a.name AS authority_name
FROM "user" u
LEFT JOIN user_authority ua ON ua.user_id = u.id
LEFT JOIN authority a ON a.id = ua.authority_id
WHERE u.username = $1
ORDER BY a.id
"#;

#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, AuthError> {
        let pool = PgPool::connect(database_url).await.map_err(store_error)?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl CredentialLoader for PostgresUserStore {
    #[instrument(skip(self), fields(store = "postgres"))]
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let rows = sqlx::query(FIND_BY_USERNAME)
            .bind(username)
            .fetch_all(&*self.pool)
            .await
            .map_err(store_error)?;

        let Some(first) = rows.first() else {
            return Ok(None);
        };

        let id: i64 = first.try_get("id").map_err(store_error)?;
        let name: String = first.try_get("username").map_err(store_error)?;
        let password_hash: String = first.try_get("password").map_err(store_error)?;

        let mut roles = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(role) = row
                .try_get::<Option<String>, _>("authority_name")
                .map_err(store_error)?
            {
                roles.push(Role::new(role));
            }
        }

        // Rows that violate the username/hash constraints are a data problem,
        // not a login failure.
        let user = User::new(UserId::new(id), name, password_hash, roles)
            .map_err(|e| AuthError::Store(format!("invalid user row {id}: {e}")))?;
        Ok(Some(user))
    }
}

fn store_error(e: sqlx::Error) -> AuthError {
    tracing::error!(error = %e, "user store query failed");
    AuthError::Store(e.to_string())
}
