//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! parcel migrate
//! ```
//!
//! # Environment Variables
//!
//! - `PARCEL_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Address migrations live in `crates/api/migrations/`. The session table
//! (`tower_sessions.session`) is created by `tower-sessions-sqlx-store`.

use tower_sessions_sqlx_store::PostgresStore;

use super::{CommandError, database_url};

/// Apply address migrations and create the session table.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = parcel_api::db::create_pool(&database_url).await?;

    tracing::info!("Running address migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
