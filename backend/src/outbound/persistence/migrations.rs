//! Embedded schema migrations.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::ports::MarketRepositoryError;

/// Migrations from the `backend/migrations` directory.
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply all pending migrations over a short-lived synchronous connection.
///
/// # Errors
///
/// Returns a connection error when the database is unreachable and a query
/// error when a migration fails.
pub fn migrate_schema(database_url: &str) -> Result<(), MarketRepositoryError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| MarketRepositoryError::connection(err.to_string()))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MarketRepositoryError::query(format!("migration: {err}")))?;
    info!(applied = applied.len(), "schema migrations complete");
    Ok(())
}

/// Run [`migrate_schema`] on the blocking thread pool.
///
/// # Errors
///
/// As [`migrate_schema`]; a panicked migration task is reported as a query
/// error.
pub async fn run_migrations(database_url: &str) -> Result<(), MarketRepositoryError> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || migrate_schema(&url))
        .await
        .map_err(|err| MarketRepositoryError::query(format!("migration task: {err}")))?
}
