use common_auth::ROLE_USER;
use sqlx::PgPool;

/// Durable mapping from username to role.
///
/// The backing table is the only mutable shared state in the service; every
/// operation is a single atomic statement, so concurrent first logins for the
/// same principal converge on one persisted role.
#[derive(Clone)]
pub struct RoleStore {
    pool: PgPool,
}

impl RoleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Self-initializing schema: create-if-absent, run once at startup.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS user_roles (
                username TEXT PRIMARY KEY,
                role TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Pure lookup, no side effects.
    pub async fn get_role(&self, username: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT role FROM user_roles WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    /// Idempotent upsert.
    pub async fn set_role(&self, username: &str, role: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_roles (username, role) VALUES ($1, $2)
             ON CONFLICT (username) DO UPDATE SET role = EXCLUDED.role",
        )
        .bind(username)
        .bind(role)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Returns the existing role, or assigns the least-privileged default to
    /// a first-time principal. The no-op conflict update makes RETURNING
    /// yield the already-persisted role, so racing first logins all observe
    /// the same assignment.
    pub async fn ensure_role(&self, username: &str) -> Result<String, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO user_roles (username, role) VALUES ($1, $2)
             ON CONFLICT (username) DO UPDATE SET role = user_roles.role
             RETURNING role",
        )
        .bind(username)
        .bind(ROLE_USER)
        .fetch_one(&self.pool)
        .await
    }
}
