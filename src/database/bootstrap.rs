use sqlx::PgPool;

use crate::error::Result;
use crate::utils::crypto::hash_password;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Creates the default administrator when no `admin` account exists.
/// Returns whether a row was inserted.
pub async fn ensure_admin(pool: &PgPool, initial_password: &str) -> Result<bool> {
    let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
        .bind(ADMIN_USERNAME)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Ok(false);
    }

    let hashed = hash_password(initial_password)?;
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, role, first_login, is_active)
        VALUES ($1, $2, $3, 'admin', TRUE, TRUE)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(ADMIN_USERNAME)
    .bind(ADMIN_EMAIL)
    .bind(hashed)
    .execute(pool)
    .await?;

    let created = result.rows_affected() > 0;
    if created {
        tracing::info!(username = ADMIN_USERNAME, "default administrator created");
    }
    Ok(created)
}
