use anyhow::Context;

use crate::config;
use crate::database::DatabaseManager;
use crate::services::UserService;

pub async fn handle(email: &str, password: &str) -> anyhow::Result<()> {
    let store = DatabaseManager::open_store(&config::config().database)
        .await
        .context("failed to open the entity store")?;

    let user = UserService::new(store)
        .create_superuser(email, password)
        .await
        .context("failed to create superuser")?;
    println!("Superuser {} created (id {})", user.email, user.id);
    Ok(())
}
