use anyhow::Context;
use tracing::{info, warn};

use crate::config;
use crate::database::DatabaseManager;
use crate::is_development;
use crate::server;
use crate::services::ImageStorage;
use crate::state::AppState;

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let config = config::config();
    info!("Starting Recipe API in {:?} mode", config.environment);
    if is_development!() {
        warn!("Development profile: insecure password hashing and a fixed JWT secret are in use");
    }

    let store = DatabaseManager::open_store(&config.database)
        .await
        .context("failed to open the entity store")?;
    let images = ImageStorage::from_config(&config.media);
    tokio::fs::create_dir_all(images.root())
        .await
        .with_context(|| format!("failed to create media root {}", images.root().display()))?;

    let app = server::app(AppState::new(store, images));

    let port = port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Recipe API listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
