//! Relational collaborators for the session authority: account, role, and
//! menu lookups over Postgres.
//!
//! The session and lock crates never see SQL; they consume the narrow
//! directory/verifier traits implemented here.

pub mod directory;
pub mod models;
pub mod password;
pub mod repositories;

/// Convenience alias for the Postgres connection pool.
pub type DbPool = sqlx::PgPool;

/// Create a connection pool for the given database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Cheap connectivity check used at startup.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the bundled migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
