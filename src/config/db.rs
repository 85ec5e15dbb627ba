// src/config/db.rs
// DOCUMENTATION: PostgreSQL pool and schema migrations
// PURPOSE: One shared pool for the repositories, schema kept in migrations/

use crate::config::Config;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Connect the shared pool
/// DOCUMENTATION: Called once by main.rs and by the provisioning CLI;
/// runs migrations/ first when RUN_MIGRATIONS is set
pub async fn init_db_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    log::info!(
        "Connecting to PostgreSQL (max {} connections, {}s acquire timeout)",
        config.db_max_connections,
        config.db_connection_timeout
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connection_timeout))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database_url)
        .await?;

    if config.run_migrations {
        run_migrations(&pool).await?;
    }

    Ok(pool)
}

/// Apply pending migrations in version order; already applied ones are skipped
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    let migrator = sqlx::migrate!("./migrations");
    log::info!("Checking {} schema migrations", migrator.iter().count());

    migrator.run(pool).await?;
    Ok(())
}
