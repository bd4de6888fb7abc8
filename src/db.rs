use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::shared::AppError;

/// Connects to Postgres and brings the schema up to date
#[instrument(skip(database_url))]
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to connect to database");
            AppError::DatabaseError(e.to_string())
        })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to run database migrations");
            AppError::DatabaseError(e.to_string())
        })?;

    info!("Database connected and migrations applied");
    Ok(pool)
}

/// Maps a failed write to the error the caller should see.
/// Constraint violations are caller mistakes, everything else is a database fault.
pub fn map_write_error(error: sqlx::Error, what: &str) -> AppError {
    if let Some(db_error) = error.as_database_error() {
        if db_error.is_unique_violation() {
            return AppError::Validation(format!("{what} already exists"));
        }
        if db_error.is_foreign_key_violation() {
            return AppError::Conflict(format!("{what} is referenced by other records"));
        }
    }
    warn!(error = %error, "Database write failed");
    AppError::DatabaseError(error.to_string())
}
