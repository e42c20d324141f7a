use std::sync::Arc;

use anyhow::Result;
use log::info;

pub mod api;
pub mod assessment;
pub mod config;
pub mod database;
pub mod openai;
pub mod rubric;

use api::AppState;
use config::Config;
use database::DatabaseManager;

pub async fn run() -> Result<()> {
    let config = Config::from_env();
    info!("BrandPulse starting...");

    let db = Arc::new(DatabaseManager::new(&config.database).await?);
    db.initialize_schema().await?;

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config, db);
    let router = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, router).await?;

    Ok(())
}
