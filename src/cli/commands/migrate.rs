use anyhow::Context;
use tracing::info;

use crate::config;
use crate::database::DatabaseManager;

pub async fn handle() -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config::config().database)
        .await
        .context("failed to connect to the database")?;
    DatabaseManager::migrate(&pool).await.context("migration failed")?;
    info!("Migrations applied");
    Ok(())
}
