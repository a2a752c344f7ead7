use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::AppConfig;

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.timeouts.store)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}

/// Applies pending migrations. Startup stops on failure: the email unique
/// constraint lives in the schema.
pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("run database migrations")?;
    tracing::info!("database migrations applied");
    Ok(())
}
