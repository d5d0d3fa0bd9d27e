// src/common/migrations.rs
//! Database schema management for the reference SQLite store

use sqlx::SqlitePool;
use tracing::info;

/// Create the users table and its uniqueness indexes if they don't exist.
///
/// Email is unique across the store; the (provider, provider_id) tuple is
/// unique when present so `find_or_create` can never produce duplicates.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            password TEXT,
            first TEXT,
            last TEXT,
            provider TEXT,
            provider_id TEXT,
            avatar TEXT,
            last_login TEXT,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_oauth
        ON users(provider, provider_id)
        WHERE provider IS NOT NULL AND provider_id IS NOT NULL
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database migration completed");

    Ok(())
}
